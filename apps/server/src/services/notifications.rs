//! Speaker notice hand-off
//!
//! Turns listed schedules into one notice per reachable speaker. Delivery (templates,
//! mail transport, queueing) belongs to a separate consumer; nothing here sends.

use convene_query::{ObjectId, Page, TenantId};
use serde::Serialize;

use crate::models::ScheduleView;

/// Title used when a notice has no session to name.
pub const FALLBACK_SESSION_TITLE: &str = "the event";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerNotice {
    pub tenant_id: TenantId,
    pub speaker_id: ObjectId,
    pub speaker_name: String,
    pub email: String,
    pub schedule_id: ObjectId,
    pub session_title: String,
}

/// Notices for the speakers of one schedule. Speakers without an email are skipped.
pub fn schedule_notices(schedule: &ScheduleView) -> Vec<SpeakerNotice> {
    let session_title = if schedule.title.trim().is_empty() {
        FALLBACK_SESSION_TITLE.to_string()
    } else {
        schedule.title.clone()
    };

    schedule
        .speakers
        .iter()
        .filter_map(|speaker| {
            let email = speaker.email.as_deref().map(str::trim).filter(|e| !e.is_empty())?;
            Some(SpeakerNotice {
                tenant_id: schedule.tenant_id,
                speaker_id: speaker.id,
                speaker_name: speaker.name.clone(),
                email: email.to_string(),
                schedule_id: schedule.id,
                session_title: session_title.clone(),
            })
        })
        .collect()
}

pub fn page_notices(page: &Page<ScheduleView>) -> Vec<SpeakerNotice> {
    page.items.iter().flat_map(schedule_notices).collect()
}
