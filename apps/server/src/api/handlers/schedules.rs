//! Event schedule handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use convene_query::Page;

use super::path_id;
use crate::{
    auth::Tenant,
    models::ScheduleView,
    queries::{ScheduleFilter, ScheduleQueryParams},
    state::AppState,
    Result,
};

/// GET /api/event-schedules
pub async fn list_schedules(
    State(state): State<AppState>,
    Tenant(ctx): Tenant,
    Query(params): Query<ScheduleQueryParams>,
) -> Result<Json<Page<ScheduleView>>> {
    let filter = ScheduleFilter::try_from(params)?;
    Ok(Json(state.listings.list_schedules(&ctx, &filter).await?))
}

/// GET /api/event-schedules/:id
pub async fn get_schedule(
    State(state): State<AppState>,
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
) -> Result<Json<ScheduleView>> {
    let id = path_id("id", &id)?;
    Ok(Json(state.listings.get_schedule(&ctx, id).await?))
}
