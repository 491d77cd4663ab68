//! Handlers for tracks of a performance: upload, streaming, completion,
//! deletion.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use perfman_core::schedule::DEFAULT_TRACK_PERFORMER;
use perfman_core::types::EntityId;
use perfman_store::files::remove_file_best_effort;
use perfman_store::models::track::CreateTrack;
use perfman_store::repositories::TrackRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppMultipart};
use crate::handlers::media::serve_file;
use crate::handlers::upload::{client_filename, write_field};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub is_completed: bool,
}

/// POST /api/events/{event_id}/performances/{performance_id}/upload
///
/// Multipart form with a required audio `file` part and an optional
/// `performer` text part, in either order. A name already taken in the
/// performance directory is stored with a `_N` suffix.
pub async fn upload(
    State(state): State<AppState>,
    Path((event_id, performance_id)): Path<(EntityId, EntityId)>,
    AppMultipart(mut multipart): AppMultipart,
) -> AppResult<impl IntoResponse> {
    let mut performer: Option<String> = None;
    let mut stored: Option<(String, std::path::PathBuf)> = None;

    let read = async {
        while let Some(mut field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "file" if stored.is_none() => {
                    let raw =
                        client_filename(&field).ok_or_else(|| AppError::BadRequest("No file selected".into()))?;
                    let mut claimed =
                        TrackRepo::claim_file(&state.store, &event_id, &performance_id, &raw).await?;
                    stored = Some((claimed.filename.clone(), claimed.path.clone()));
                    write_field(&mut field, &mut claimed.file, &claimed.path).await?;
                }
                "performer" => performer = Some(field.text().await?),
                _ => {}
            }
        }
        Ok::<(), AppError>(())
    }
    .await;

    if let Err(e) = read {
        if let Some((_, path)) = &stored {
            remove_file_best_effort(path).await;
        }
        return Err(e);
    }

    let (filename, _) = stored.ok_or_else(|| AppError::BadRequest("No file provided".into()))?;
    let performer = performer
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_TRACK_PERFORMER.to_string());

    let track = TrackRepo::create(
        &state.store,
        &event_id,
        &performance_id,
        &CreateTrack { filename, performer },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(track)))
}

/// GET /api/events/{event_id}/performances/{performance_id}/files/{filename}
///
/// Streams an uploaded file; supports single `Range` requests.
pub async fn serve(
    State(state): State<AppState>,
    Path((event_id, performance_id, filename)): Path<(EntityId, EntityId, String)>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let path = TrackRepo::file_path(&state.store, &event_id, &performance_id, &filename).await?;
    serve_file(&path, &headers, "File", &filename).await
}

/// PUT /api/events/{event_id}/performances/{performance_id}/tracks/{track_id}/completion
pub async fn set_completion(
    State(state): State<AppState>,
    Path((event_id, performance_id, track_id)): Path<(EntityId, EntityId, EntityId)>,
    AppJson(input): AppJson<CompletionRequest>,
) -> AppResult<impl IntoResponse> {
    let track = TrackRepo::set_completion(
        &state.store,
        &event_id,
        &performance_id,
        &track_id,
        input.is_completed,
    )
    .await?;
    Ok(Json(track))
}

/// DELETE /api/events/{event_id}/performances/{performance_id}/tracks/{track_id}
pub async fn delete(
    State(state): State<AppState>,
    Path((event_id, performance_id, track_id)): Path<(EntityId, EntityId, EntityId)>,
) -> AppResult<StatusCode> {
    TrackRepo::delete(&state.store, &event_id, &performance_id, &track_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
