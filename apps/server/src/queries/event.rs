//! Event listing.

use chrono::{DateTime, Utc};
use convene_query::{
    EntityQuerySpec, FieldPath, JoinSpec, NormalizedFilter, PaginationPolicy, Scalar, SortKey,
};
use serde::Deserialize;
use validator::Validate;

use super::{parse_bool, parse_datetime, parse_enum, parse_int, validate, MAX_TEXT_LEN};
use crate::models::{collections, Currency, EventFormat, EventStatus, EventType};
use crate::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventQueryParams {
    pub tenant_id: Option<String>,
    #[validate(length(max = MAX_TEXT_LEN))]
    pub search: Option<String>,
    #[validate(length(max = MAX_TEXT_LEN))]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub format: Option<String>,
    pub status: Option<String>,
    pub start_date_from: Option<String>,
    pub end_date_to: Option<String>,
    #[validate(length(max = MAX_TEXT_LEN))]
    pub location: Option<String>,
    pub currency: Option<String>,
    pub min_participants: Option<String>,
    pub max_participants: Option<String>,
    pub is_public: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub tenant_claim: Option<String>,
    pub search: Option<String>,
    pub title: Option<String>,
    pub event_type: Option<EventType>,
    pub format: Option<EventFormat>,
    pub status: Option<EventStatus>,
    pub start_date_from: Option<DateTime<Utc>>,
    pub end_date_to: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub currency: Option<Currency>,
    pub min_participants: Option<i64>,
    pub max_participants: Option<i64>,
    pub is_public: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn non_negative(field: &str, value: Option<i64>) -> Result<Option<i64>> {
    match value {
        Some(n) if n < 0 => Err(Error::invalid(field, "must not be negative")),
        other => Ok(other),
    }
}

impl TryFrom<EventQueryParams> for EventFilter {
    type Error = Error;

    fn try_from(params: EventQueryParams) -> Result<Self> {
        validate(&params)?;
        let min_participants = non_negative(
            "minParticipants",
            parse_int("minParticipants", params.min_participants.as_deref())?,
        )?;
        let max_participants = non_negative(
            "maxParticipants",
            parse_int("maxParticipants", params.max_participants.as_deref())?,
        )?;
        Ok(Self {
            event_type: parse_enum("type", params.event_type.as_deref())?,
            format: parse_enum("format", params.format.as_deref())?,
            status: parse_enum("status", params.status.as_deref())?,
            start_date_from: parse_datetime("startDateFrom", params.start_date_from.as_deref())?,
            end_date_to: parse_datetime("endDateTo", params.end_date_to.as_deref())?,
            currency: parse_enum("currency", params.currency.as_deref())?,
            is_public: parse_bool("isPublic", params.is_public.as_deref())?,
            page: parse_int("page", params.page.as_deref())?,
            limit: parse_int("limit", params.limit.as_deref())?,
            min_participants,
            max_participants,
            tenant_claim: params.tenant_id,
            search: params.search,
            title: params.title,
            location: params.location,
        })
    }
}

fn text<T: std::fmt::Display>(value: Option<T>) -> Option<Scalar> {
    value.map(|v| Scalar::Text(v.to_string()))
}

impl EventFilter {
    pub fn normalize(&self, policy: &PaginationPolicy) -> Result<NormalizedFilter> {
        let pagination = policy.resolve(self.page, self.limit)?;
        Ok(NormalizedFilter::builder(pagination)
            .tenant_claim(self.tenant_claim.as_deref())
            .equals("type", text(self.event_type))
            .equals("format", text(self.format))
            .equals("status", text(self.status))
            .equals("currency", text(self.currency))
            .equals("isPublic", self.is_public.map(Scalar::Bool))
            .at_least("startDate", self.start_date_from.map(Scalar::Timestamp))
            .at_most("endDate", self.end_date_to.map(Scalar::Timestamp))
            .at_least("numberOfParticipants", self.min_participants.map(Scalar::Int))
            .at_most("numberOfParticipants", self.max_participants.map(Scalar::Int))
            .text("title", self.title.as_deref())
            .text_any(
                &["locations.name", "locations.address"],
                self.location.as_deref(),
            )
            .search(self.search.as_deref())
            .build())
    }
}

/// Events with their schedules attached, and the tenant's speakers resolved inside
/// each schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventListing;

impl EntityQuerySpec for EventListing {
    fn entity(&self) -> &'static str {
        "event"
    }

    fn collection(&self) -> &'static str {
        collections::EVENTS
    }

    fn joins(&self) -> Vec<JoinSpec> {
        vec![
            JoinSpec::many_by_id(
                "eventScheduleIds",
                collections::EVENT_SCHEDULES,
                "schedules",
            ),
            JoinSpec::many_by_id_within(
                "schedules",
                "speakers",
                collections::SPEAKERS,
                "speakers",
            ),
        ]
    }

    fn search_fields(&self) -> Vec<FieldPath> {
        ["title", "description", "locations.name", "locations.address"]
            .into_iter()
            .map(FieldPath::new)
            .collect()
    }

    fn default_sort(&self) -> Vec<SortKey> {
        vec![SortKey::asc("startDate").timestamp()]
    }
}
