//! Speaker handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use convene_query::Page;

use super::path_id;
use crate::{
    auth::Tenant,
    models::{ScheduleView, Speaker},
    queries::{ScheduleFilter, ScheduleQueryParams, SpeakerFilter, SpeakerQueryParams},
    state::AppState,
    Result,
};

/// GET /api/speakers
pub async fn list_speakers(
    State(state): State<AppState>,
    Tenant(ctx): Tenant,
    Query(params): Query<SpeakerQueryParams>,
) -> Result<Json<Page<Speaker>>> {
    let filter = SpeakerFilter::try_from(params)?;
    Ok(Json(state.listings.list_speakers(&ctx, &filter).await?))
}

/// GET /api/speakers/:id
pub async fn get_speaker(
    State(state): State<AppState>,
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
) -> Result<Json<Speaker>> {
    let id = path_id("id", &id)?;
    Ok(Json(state.listings.get_speaker(&ctx, id).await?))
}

/// GET /api/speakers/:id/schedules
///
/// Accepts the schedule listing filters; a `speakerId` filter is ANDed with the path.
pub async fn list_speaker_schedules(
    State(state): State<AppState>,
    Tenant(ctx): Tenant,
    Path(speaker_id): Path<String>,
    Query(params): Query<ScheduleQueryParams>,
) -> Result<Json<Page<ScheduleView>>> {
    let speaker_id = path_id("speakerId", &speaker_id)?;
    let filter = ScheduleFilter::try_from(params)?;
    Ok(Json(
        state
            .listings
            .list_schedules_for_speaker(&ctx, speaker_id, &filter)
            .await?,
    ))
}
