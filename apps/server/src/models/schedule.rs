use chrono::{DateTime, Utc};
use convene_query::{ObjectId, TenantId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use super::{SessionType, Speaker};

/// A listed schedule: speakers resolved, parent event title derived.
///
/// `event_id` is stored free text and only joins when it has the identifier shape.
/// Anything other than a string reads as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: TenantId,
    #[serde(
        default,
        deserialize_with = "text_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_type: Option<SessionType>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    /// Absent when `event_id` is not coercible or names no event of the tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_title: Option<String>,
}

fn text_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(text) => Some(text),
        _ => None,
    })
}
