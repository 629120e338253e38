//! Document models for the listed collections.
//!
//! Stored documents are JSON objects keyed by `_id`, with camelCase field names and
//! RFC 3339 timestamps. The `*View` types describe rows after joins and projection.

pub mod enums;
pub mod event;
pub mod schedule;
pub mod speaker;

pub use enums::{
    Currency, EventFormat, EventStatus, EventType, SessionType, SpeakerType, UnknownVariant,
};
pub use event::{Event, EventView, Location};
pub use schedule::ScheduleView;
pub use speaker::Speaker;

pub mod collections {
    pub const EVENTS: &str = "events";
    pub const EVENT_SCHEDULES: &str = "event_schedules";
    pub const SPEAKERS: &str = "speakers";
}
