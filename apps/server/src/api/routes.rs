//! Listing routes, nested under `/api`

use axum::{routing::get, Router};

use super::handlers::{events, schedules, speakers};
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(events::list_events))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id/speakers", get(events::list_event_speakers))
        .route("/event-schedules", get(schedules::list_schedules))
        .route("/event-schedules/:id", get(schedules::get_schedule))
        .route("/speakers", get(speakers::list_speakers))
        .route("/speakers/:id", get(speakers::get_speaker))
        .route(
            "/speakers/:id/schedules",
            get(speakers::list_speaker_schedules),
        )
}
