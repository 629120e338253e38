//! Event schedule listings: the general listing and schedules of one speaker.

use chrono::{DateTime, Utc};
use convene_query::{
    EntityQuerySpec, FieldPath, JoinSpec, NormalizedFilter, ObjectId, PaginationPolicy,
    Projection, Scalar, SortKey,
};
use serde::Deserialize;
use validator::Validate;

use super::{parse_datetime, parse_enum, parse_id, parse_int, validate, MAX_TEXT_LEN};
use crate::models::{collections, SessionType};
use crate::Result;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQueryParams {
    pub tenant_id: Option<String>,
    pub event_id: Option<String>,
    #[validate(length(max = MAX_TEXT_LEN))]
    pub search: Option<String>,
    #[validate(length(max = MAX_TEXT_LEN))]
    pub title: Option<String>,
    pub session_type: Option<String>,
    pub start_time_from: Option<String>,
    pub end_time_to: Option<String>,
    #[validate(length(max = MAX_TEXT_LEN))]
    pub location: Option<String>,
    pub speaker_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleFilter {
    pub tenant_claim: Option<String>,
    pub event_id: Option<ObjectId>,
    pub search: Option<String>,
    pub title: Option<String>,
    pub session_type: Option<SessionType>,
    pub start_time_from: Option<DateTime<Utc>>,
    pub end_time_to: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub speaker_id: Option<ObjectId>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl TryFrom<ScheduleQueryParams> for ScheduleFilter {
    type Error = crate::Error;

    fn try_from(params: ScheduleQueryParams) -> Result<Self> {
        validate(&params)?;
        Ok(Self {
            event_id: parse_id("eventId", params.event_id.as_deref())?,
            session_type: parse_enum("sessionType", params.session_type.as_deref())?,
            start_time_from: parse_datetime("startTimeFrom", params.start_time_from.as_deref())?,
            end_time_to: parse_datetime("endTimeTo", params.end_time_to.as_deref())?,
            speaker_id: parse_id("speakerId", params.speaker_id.as_deref())?,
            page: parse_int("page", params.page.as_deref())?,
            limit: parse_int("limit", params.limit.as_deref())?,
            tenant_claim: params.tenant_id,
            search: params.search,
            title: params.title,
            location: params.location,
        })
    }
}

impl ScheduleFilter {
    /// `speaker` scopes the listing to one speaker's schedules, ANDed with any
    /// `speakerId` already present in the filter.
    pub fn normalize(
        &self,
        policy: &PaginationPolicy,
        speaker: Option<ObjectId>,
    ) -> Result<NormalizedFilter> {
        let pagination = policy.resolve(self.page, self.limit)?;
        let mut builder = NormalizedFilter::builder(pagination)
            .tenant_claim(self.tenant_claim.as_deref())
            .equals("eventId", self.event_id.map(Scalar::Id))
            .equals(
                "sessionType",
                self.session_type.map(|s| Scalar::Text(s.as_str().to_string())),
            )
            .at_least("startTime", self.start_time_from.map(Scalar::Timestamp))
            .at_most("endTime", self.end_time_to.map(Scalar::Timestamp))
            .equals("speakers", self.speaker_id.map(Scalar::Id))
            .text("title", self.title.as_deref())
            .text("location", self.location.as_deref())
            .search(self.search.as_deref());
        if let Some(speaker) = speaker {
            builder = builder.equals("speakers", Some(Scalar::Id(speaker)));
        }
        Ok(builder.build())
    }
}

/// Schedules with speakers resolved and the parent event title derived.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleListing;

impl EntityQuerySpec for ScheduleListing {
    fn entity(&self) -> &'static str {
        "event_schedule"
    }

    fn collection(&self) -> &'static str {
        collections::EVENT_SCHEDULES
    }

    fn joins(&self) -> Vec<JoinSpec> {
        vec![
            JoinSpec::many_by_id("speakers", collections::SPEAKERS, "speakers"),
            JoinSpec::one_by_coerced_key(
                "eventId",
                "eventObjectId",
                collections::EVENTS,
                "event",
            ),
        ]
    }

    fn search_fields(&self) -> Vec<FieldPath> {
        [
            "title",
            "location",
            "speakers.name",
            "speakers.bio",
            "event.title",
            "event.description",
        ]
        .into_iter()
        .map(FieldPath::new)
        .collect()
    }

    fn projection(&self) -> Projection {
        Projection::new()
            .derive("eventTitle", "event.title")
            .exclude("eventObjectId")
            .exclude("event")
    }

    fn default_sort(&self) -> Vec<SortKey> {
        vec![SortKey::asc("startTime").timestamp()]
    }
}
