//! Handlers for the `/events` resource.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use perfman_core::error::CoreError;
use perfman_core::media::validate_image_filename;
use perfman_core::types::EntityId;
use perfman_store::files::create_staging;
use perfman_store::models::event::{CreateEvent, UpdateEvent};
use perfman_store::repositories::EventRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppMultipart};
use crate::handlers::media::serve_file;
use crate::handlers::upload::{client_filename, write_field};
use crate::state::AppState;

/// GET /api/events
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(EventRepo::list(&state.store).await))
}

/// POST /api/events
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateEvent>,
) -> AppResult<impl IntoResponse> {
    let event = EventRepo::create(&state.store, &input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/events/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let event = EventRepo::find_by_id(&state.store, &id)
        .await
        .ok_or_else(|| CoreError::not_found("Event", &id))?;
    Ok(Json(event))
}

/// PUT /api/events/{id}
///
/// Accepts `name`, `description` and `imagePosition`; other keys are ignored.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    AppJson(input): AppJson<UpdateEvent>,
) -> AppResult<impl IntoResponse> {
    let event = EventRepo::update(&state.store, &id, &input).await?;
    Ok(Json(event))
}

/// DELETE /api/events/{id}
///
/// Removes the event and everything stored under its directory.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    EventRepo::delete(&state.store, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/events/{id}/cover
///
/// Multipart form with a required image `file` field. Replaces any
/// previous cover image.
pub async fn upload_cover(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    AppMultipart(mut multipart): AppMultipart,
) -> AppResult<impl IntoResponse> {
    EventRepo::find_by_id(&state.store, &id)
        .await
        .ok_or_else(|| CoreError::not_found("Event", &id))?;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename =
            client_filename(&field).ok_or_else(|| AppError::BadRequest("No file selected".into()))?;
        let ext = validate_image_filename(&filename)?;

        let event_dir = state.store.layout().event_dir(&id);
        let mut staged = create_staging(&event_dir, "cover").await?;
        write_field(&mut field, &mut staged.file, &staged.path).await?;
        drop(staged.file);

        let event = EventRepo::set_cover_image(&state.store, &id, &staged.path, &ext).await?;
        return Ok(Json(event));
    }

    Err(AppError::BadRequest("Missing required 'file' field".into()))
}

/// GET /api/events/{id}/cover
pub async fn get_cover(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let event = EventRepo::find_by_id(&state.store, &id)
        .await
        .ok_or_else(|| CoreError::not_found("Event", &id))?;
    let cover = event
        .cover_image
        .ok_or_else(|| CoreError::not_found("CoverImage", &id))?;

    let path = state.store.layout().event_file(&id, &cover);
    serve_file(&path, &headers, "CoverImage", &id).await
}
