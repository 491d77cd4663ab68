//! Handlers for breaks nested under `/events/{event_id}`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use perfman_core::types::EntityId;
use perfman_store::models::schedule_break::{CreateBreak, UpdateBreak};
use perfman_store::repositories::BreakRepo;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::performance::ReorderRequest;
use crate::response::SuccessResponse;
use crate::state::AppState;

/// GET /api/events/{event_id}/breaks
pub async fn list(
    State(state): State<AppState>,
    Path(event_id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(BreakRepo::list(&state.store, &event_id).await?))
}

/// POST /api/events/{event_id}/breaks
///
/// `type` must be one of the known break types.
pub async fn create(
    State(state): State<AppState>,
    Path(event_id): Path<EntityId>,
    AppJson(input): AppJson<CreateBreak>,
) -> AppResult<impl IntoResponse> {
    let created = BreakRepo::create(&state.store, &event_id, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/events/{event_id}/breaks/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((event_id, id)): Path<(EntityId, EntityId)>,
    AppJson(input): AppJson<UpdateBreak>,
) -> AppResult<impl IntoResponse> {
    let updated = BreakRepo::update(&state.store, &event_id, &id, &input).await?;
    Ok(Json(updated))
}

/// DELETE /api/events/{event_id}/breaks/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((event_id, id)): Path<(EntityId, EntityId)>,
) -> AppResult<StatusCode> {
    BreakRepo::delete(&state.store, &event_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/events/{event_id}/breaks/reorder
pub async fn reorder(
    State(state): State<AppState>,
    Path(event_id): Path<EntityId>,
    AppJson(input): AppJson<ReorderRequest>,
) -> AppResult<impl IntoResponse> {
    BreakRepo::reorder(&state.store, &event_id, &input.order).await?;
    Ok(Json(SuccessResponse::ok()))
}
