//! Event handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use convene_query::Page;

use super::path_id;
use crate::{
    auth::Tenant,
    models::{EventView, Speaker},
    queries::{EventFilter, EventQueryParams, EventSpeakerFilter, EventSpeakerQueryParams},
    state::AppState,
    Result,
};

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    Tenant(ctx): Tenant,
    Query(params): Query<EventQueryParams>,
) -> Result<Json<Page<EventView>>> {
    let filter = EventFilter::try_from(params)?;
    Ok(Json(state.listings.list_events(&ctx, &filter).await?))
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
) -> Result<Json<EventView>> {
    let id = path_id("id", &id)?;
    Ok(Json(state.listings.get_event(&ctx, id).await?))
}

/// GET /api/events/:id/speakers
pub async fn list_event_speakers(
    State(state): State<AppState>,
    Tenant(ctx): Tenant,
    Path(event_id): Path<String>,
    Query(params): Query<EventSpeakerQueryParams>,
) -> Result<Json<Page<Speaker>>> {
    let event_id = path_id("eventId", &event_id)?;
    let filter = EventSpeakerFilter::try_from(params)?;
    Ok(Json(
        state
            .listings
            .list_speakers_for_event(&ctx, event_id, &filter)
            .await?,
    ))
}
