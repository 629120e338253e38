//! Services - listing orchestration and the speaker notice hand-off

pub mod listing;
pub mod notifications;

pub use listing::ListingService;
pub use notifications::{page_notices, schedule_notices, SpeakerNotice};
