//! Speaker listings: the tenant's speakers, and the speakers appearing in one event.

use convene_query::{
    Clause, EntityQuerySpec, FieldPath, JoinSpec, NormalizedFilter, ObjectId, PaginationPolicy,
    Predicate, Projection, Scalar, SortKey,
};
use serde::Deserialize;
use validator::Validate;

use super::{parse_enum, parse_int, validate, MAX_TEXT_LEN};
use crate::models::{collections, SpeakerType};
use crate::Result;

const APPEARANCES: &str = "appearances";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerQueryParams {
    pub tenant_id: Option<String>,
    #[validate(length(max = MAX_TEXT_LEN))]
    pub search: Option<String>,
    #[validate(length(max = MAX_TEXT_LEN))]
    pub name: Option<String>,
    #[validate(length(max = MAX_TEXT_LEN))]
    pub company: Option<String>,
    pub speaker_type: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeakerFilter {
    pub tenant_claim: Option<String>,
    pub search: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub speaker_type: Option<SpeakerType>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl TryFrom<SpeakerQueryParams> for SpeakerFilter {
    type Error = crate::Error;

    fn try_from(params: SpeakerQueryParams) -> Result<Self> {
        validate(&params)?;
        Ok(Self {
            speaker_type: parse_enum("speakerType", params.speaker_type.as_deref())?,
            page: parse_int("page", params.page.as_deref())?,
            limit: parse_int("limit", params.limit.as_deref())?,
            tenant_claim: params.tenant_id,
            search: params.search,
            name: params.name,
            company: params.company,
        })
    }
}

impl SpeakerFilter {
    pub fn normalize(&self, policy: &PaginationPolicy) -> Result<NormalizedFilter> {
        let pagination = policy.resolve(self.page, self.limit)?;
        Ok(NormalizedFilter::builder(pagination)
            .tenant_claim(self.tenant_claim.as_deref())
            .equals(
                "speakerType",
                self.speaker_type
                    .map(|t| Scalar::Text(t.as_str().to_string())),
            )
            .text("name", self.name.as_deref())
            .text("company", self.company.as_deref())
            .search(self.search.as_deref())
            .build())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpeakerListing;

impl EntityQuerySpec for SpeakerListing {
    fn entity(&self) -> &'static str {
        "speaker"
    }

    fn collection(&self) -> &'static str {
        collections::SPEAKERS
    }

    fn search_fields(&self) -> Vec<FieldPath> {
        ["name", "company", "bio"]
            .into_iter()
            .map(FieldPath::new)
            .collect()
    }

    fn default_sort(&self) -> Vec<SortKey> {
        vec![SortKey::asc("name")]
    }
}

/// Query parameters of `GET /events/{eventId}/speakers`. The tenant is never taken from
/// the query here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventSpeakerQueryParams {
    #[validate(length(max = MAX_TEXT_LEN))]
    pub search: Option<String>,
    #[validate(length(max = MAX_TEXT_LEN))]
    pub name: Option<String>,
    #[validate(length(max = MAX_TEXT_LEN))]
    pub company: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSpeakerFilter {
    pub search: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl TryFrom<EventSpeakerQueryParams> for EventSpeakerFilter {
    type Error = crate::Error;

    fn try_from(params: EventSpeakerQueryParams) -> Result<Self> {
        validate(&params)?;
        Ok(Self {
            page: parse_int("page", params.page.as_deref())?,
            limit: parse_int("limit", params.limit.as_deref())?,
            search: params.search,
            name: params.name,
            company: params.company,
        })
    }
}

impl EventSpeakerFilter {
    /// `name` and `company` match as alternatives. Speakers are kept only when at least
    /// one schedule of the event lists them.
    pub fn normalize(&self, policy: &PaginationPolicy) -> Result<NormalizedFilter> {
        let pagination = policy.resolve(self.page, self.limit)?;
        Ok(NormalizedFilter::builder(pagination)
            .text_either(&[("name", self.name.as_deref()), ("company", self.company.as_deref())])
            .search(self.search.as_deref())
            .joined(Clause::new(APPEARANCES, Predicate::NonEmpty))
            .build())
    }
}

/// Speakers referenced by the schedules of one event.
#[derive(Debug, Clone, Copy)]
pub struct EventSpeakerListing {
    pub event_id: ObjectId,
}

impl EventSpeakerListing {
    pub fn new(event_id: ObjectId) -> Self {
        Self { event_id }
    }
}

impl EntityQuerySpec for EventSpeakerListing {
    fn entity(&self) -> &'static str {
        "event_speaker"
    }

    fn collection(&self) -> &'static str {
        collections::SPEAKERS
    }

    fn joins(&self) -> Vec<JoinSpec> {
        vec![JoinSpec::referenced_by(
            collections::EVENT_SCHEDULES,
            "speakers",
            vec![Clause::equals("eventId", Scalar::Id(self.event_id))],
            APPEARANCES,
        )]
    }

    fn search_fields(&self) -> Vec<FieldPath> {
        ["name", "company"].into_iter().map(FieldPath::new).collect()
    }

    fn projection(&self) -> Projection {
        Projection::new().exclude(APPEARANCES)
    }

    fn default_sort(&self) -> Vec<SortKey> {
        vec![SortKey::asc("name")]
    }
}
