//! Listing call sites: raw query parameters, typed filters and entity query shapes.
//!
//! Each listing parses its raw query string into a typed filter first. Malformed dates,
//! identifiers, enum values, numbers and booleans are rejected there with the offending
//! field named, before any query is compiled.

pub mod event;
pub mod schedule;
pub mod speaker;

pub use event::{EventFilter, EventListing, EventQueryParams};
pub use schedule::{ScheduleFilter, ScheduleListing, ScheduleQueryParams};
pub use speaker::{
    EventSpeakerFilter, EventSpeakerListing, EventSpeakerQueryParams, SpeakerFilter,
    SpeakerListing, SpeakerQueryParams,
};

use chrono::{DateTime, Utc};
use convene_query::ObjectId;
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

use crate::{Error, Result};

/// Upper bound for free-text filter values.
pub const MAX_TEXT_LEN: u64 = 200;

/// Runs derived `validator` checks and reports the first failing field.
pub(crate) fn validate(params: &impl Validate) -> Result<()> {
    params.validate().map_err(first_violation)
}

fn first_violation(errors: ValidationErrors) -> Error {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    match fields.first() {
        Some((field, violations)) => {
            let message = violations
                .first()
                .and_then(|v| v.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("must be at most {MAX_TEXT_LEN} characters"));
            Error::invalid(camel_case(field), message)
        }
        None => Error::invalid("query", "invalid query parameters"),
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn parse_id(field: &str, value: Option<&str>) -> Result<Option<ObjectId>> {
    present(value)
        .map(|v| {
            ObjectId::parse(v).map_err(|e| Error::invalid(field, format!("not a valid id: {e}")))
        })
        .transpose()
}

pub(crate) fn parse_datetime(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    present(value)
        .map(|v| {
            DateTime::parse_from_rfc3339(v)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| Error::invalid(field, "expected an ISO 8601 date-time"))
        })
        .transpose()
}

pub(crate) fn parse_enum<T>(field: &str, value: Option<&str>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    present(value)
        .map(|v| T::from_str(v).map_err(|e| Error::invalid(field, e.to_string())))
        .transpose()
}

pub(crate) fn parse_int(field: &str, value: Option<&str>) -> Result<Option<i64>> {
    present(value)
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| Error::invalid(field, "expected an integer"))
        })
        .transpose()
}

pub(crate) fn parse_bool(field: &str, value: Option<&str>) -> Result<Option<bool>> {
    match present(value) {
        None => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(_) => Err(Error::invalid(field, "expected true or false")),
    }
}
