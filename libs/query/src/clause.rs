//! Typed filter clauses.
//!
//! A [`Clause`] pairs a dotted [`FieldPath`] with a [`Predicate`]. Paths traverse
//! arrays implicitly: `speakers.name` visits the `name` of every element of
//! `speakers`, and a clause holds when *any* visited value satisfies the predicate.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;

use crate::id::ObjectId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// First segment; the top-level document field this path starts from.
    pub fn root(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }

    /// All values reachable from `doc` along this path, arrays flattened at every step.
    /// Null values are skipped.
    pub fn values<'a>(&self, doc: &'a JsonValue) -> Vec<&'a JsonValue> {
        let mut current = vec![doc];
        for segment in &self.0 {
            let mut next = Vec::new();
            for value in current {
                for item in flatten(value) {
                    if let Some(child) = item.get(segment.as_str()) {
                        next.push(child);
                    }
                }
            }
            current = next;
        }
        current
            .into_iter()
            .flat_map(flatten)
            .filter(|v| !v.is_null())
            .collect()
    }
}

fn flatten(value: &JsonValue) -> Vec<&JsonValue> {
    match value {
        JsonValue::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// A typed comparison operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Id(ObjectId),
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl Scalar {
    /// Orders a stored value relative to this operand. `None` when the stored value
    /// has a different type or does not parse.
    pub fn compare_stored(&self, stored: &JsonValue) -> Option<Ordering> {
        match self {
            Scalar::Text(expected) => stored.as_str().map(|s| s.cmp(expected.as_str())),
            Scalar::Id(expected) => stored
                .as_str()
                .and_then(|s| ObjectId::parse(s).ok())
                .map(|id| id.cmp(expected)),
            Scalar::Int(expected) => {
                if let Some(n) = stored.as_i64() {
                    Some(n.cmp(expected))
                } else {
                    stored
                        .as_f64()
                        .and_then(|f| f.partial_cmp(&(*expected as f64)))
                }
            }
            Scalar::Bool(expected) => stored.as_bool().map(|b| b.cmp(expected)),
            Scalar::Timestamp(expected) => stored
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc).cmp(expected)),
        }
    }

    /// Canonical text form used when binding the operand to a SQL parameter.
    pub fn to_bind_text(&self) -> String {
        match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Id(id) => id.to_hex(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Timestamp(t) => t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals(Scalar),
    /// Inclusive bounds; a missing bound is unconstrained.
    Range {
        lower: Option<Scalar>,
        upper: Option<Scalar>,
    },
    /// Literal, case-insensitive substring. The needle is never interpreted as a pattern.
    ContainsIgnoreCase(String),
    InSet(Vec<Scalar>),
    /// At least one non-null value exists at the path.
    NonEmpty,
}

impl Predicate {
    pub fn at_least(bound: Scalar) -> Self {
        Self::Range {
            lower: Some(bound),
            upper: None,
        }
    }

    pub fn at_most(bound: Scalar) -> Self {
        Self::Range {
            lower: None,
            upper: Some(bound),
        }
    }

    fn matches_value(&self, value: &JsonValue) -> bool {
        match self {
            Predicate::Equals(expected) => expected.compare_stored(value) == Some(Ordering::Equal),
            Predicate::Range { lower, upper } => {
                let above = lower.as_ref().map_or(true, |b| {
                    matches!(
                        b.compare_stored(value),
                        Some(Ordering::Greater | Ordering::Equal)
                    )
                });
                let below = upper.as_ref().map_or(true, |b| {
                    matches!(
                        b.compare_stored(value),
                        Some(Ordering::Less | Ordering::Equal)
                    )
                });
                above && below
            }
            Predicate::ContainsIgnoreCase(needle) => value
                .as_str()
                .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase())),
            Predicate::InSet(options) => options
                .iter()
                .any(|o| o.compare_stored(value) == Some(Ordering::Equal)),
            Predicate::NonEmpty => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub field: FieldPath,
    pub predicate: Predicate,
}

impl Clause {
    pub fn new(field: impl Into<FieldPath>, predicate: Predicate) -> Self {
        Self {
            field: field.into(),
            predicate,
        }
    }

    pub fn equals(field: impl Into<FieldPath>, value: Scalar) -> Self {
        Self::new(field, Predicate::Equals(value))
    }

    pub fn contains(field: impl Into<FieldPath>, needle: impl Into<String>) -> Self {
        Self::new(field, Predicate::ContainsIgnoreCase(needle.into()))
    }

    pub fn matches(&self, doc: &JsonValue) -> bool {
        self.field
            .values(doc)
            .into_iter()
            .any(|v| self.predicate.matches_value(v))
    }
}

/// A unit of a match stage. Conditions inside one stage are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Clause(Clause),
    AnyOf(Vec<Clause>),
}

impl Condition {
    pub fn matches(&self, doc: &JsonValue) -> bool {
        match self {
            Condition::Clause(clause) => clause.matches(doc),
            Condition::AnyOf(clauses) => clauses.iter().any(|c| c.matches(doc)),
        }
    }

    pub fn fields(&self) -> Vec<&FieldPath> {
        match self {
            Condition::Clause(clause) => vec![&clause.field],
            Condition::AnyOf(clauses) => clauses.iter().map(|c| &c.field).collect(),
        }
    }
}

impl From<Clause> for Condition {
    fn from(clause: Clause) -> Self {
        Condition::Clause(clause)
    }
}
