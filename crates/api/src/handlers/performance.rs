//! Handlers for performances nested under `/events/{event_id}`.

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use perfman_core::error::CoreError;
use perfman_core::media::validate_audio_filename;
use perfman_core::naming::sanitize_filename;
use perfman_core::types::EntityId;
use perfman_store::files::{create_staging, discard_staged, StagedFile};
use perfman_store::models::performance::{CreatePerformance, Performance, UpdatePerformance};
use perfman_store::repositories::{EventRepo, PerformanceRepo};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{AppJson, AppMultipart};
use crate::handlers::upload::{client_filename, write_field};
use crate::response::SuccessResponse;
use crate::state::AppState;

/// Body of a reorder request: the IDs in their new display order.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/events/{event_id}/performances
///
/// Sorted by `order`.
pub async fn list(
    State(state): State<AppState>,
    Path(event_id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(PerformanceRepo::list(&state.store, &event_id).await?))
}

/// POST /api/events/{event_id}/performances
///
/// Accepts either a JSON body or a multipart form. The multipart form
/// carries the same fields as text parts plus any number of audio `files`,
/// each of which becomes a track.
pub async fn create(
    State(state): State<AppState>,
    Path(event_id): Path<EntityId>,
    request: Request,
) -> AppResult<Response> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    let performance = if is_multipart {
        let AppMultipart(multipart) = AppMultipart::from_request(request, &state).await?;
        create_with_files(&state, &event_id, multipart).await?
    } else {
        let AppJson(input) = AppJson::<CreatePerformance>::from_request(request, &state).await?;
        PerformanceRepo::create(&state.store, &event_id, &input).await?
    };

    Ok((StatusCode::CREATED, Json(performance)).into_response())
}

/// GET /api/events/{event_id}/performances/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((event_id, id)): Path<(EntityId, EntityId)>,
) -> AppResult<impl IntoResponse> {
    let performance = PerformanceRepo::find_by_id(&state.store, &event_id, &id)
        .await?
        .ok_or_else(|| CoreError::not_found("Performance", &id))?;
    Ok(Json(performance))
}

/// PUT /api/events/{event_id}/performances/{id}
///
/// Only `name`, `performer`, `type`, `mode`, `isDone`, `order` and
/// `expectedDuration` are applied.
pub async fn update(
    State(state): State<AppState>,
    Path((event_id, id)): Path<(EntityId, EntityId)>,
    AppJson(input): AppJson<UpdatePerformance>,
) -> AppResult<impl IntoResponse> {
    let performance = PerformanceRepo::update(&state.store, &event_id, &id, &input).await?;
    Ok(Json(performance))
}

/// DELETE /api/events/{event_id}/performances/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((event_id, id)): Path<(EntityId, EntityId)>,
) -> AppResult<StatusCode> {
    PerformanceRepo::delete(&state.store, &event_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/events/{event_id}/performances/reorder
///
/// The list may name any subset of the event's performances.
pub async fn reorder(
    State(state): State<AppState>,
    Path(event_id): Path<EntityId>,
    AppJson(input): AppJson<ReorderRequest>,
) -> AppResult<impl IntoResponse> {
    PerformanceRepo::reorder(&state.store, &event_id, &input.order).await?;
    Ok(Json(SuccessResponse::ok()))
}

// ---------------------------------------------------------------------------
// Multipart creation
// ---------------------------------------------------------------------------

/// Text parts of a multipart performance form.
#[derive(Debug, Default)]
struct PerformanceForm {
    name: Option<String>,
    performer: Option<String>,
    performance_type: Option<String>,
    mode: Option<String>,
    expected_duration: Option<String>,
}

impl PerformanceForm {
    fn into_create(self) -> AppResult<CreatePerformance> {
        let name = self
            .name
            .ok_or_else(|| CoreError::Validation("name is required".into()))?;
        let expected_duration = match self.expected_duration.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
                CoreError::Validation(format!("expectedDuration must be a whole number of seconds, got '{raw}'"))
            })?),
        };
        Ok(CreatePerformance {
            name,
            performer: self.performer,
            performance_type: self.performance_type.filter(|s| !s.is_empty()),
            mode: self.mode.filter(|s| !s.is_empty()),
            expected_duration,
        })
    }
}

async fn create_with_files(
    state: &AppState,
    event_id: &str,
    mut multipart: Multipart,
) -> AppResult<Performance> {
    EventRepo::find_by_id(&state.store, event_id)
        .await
        .ok_or_else(|| CoreError::not_found("Event", event_id))?;

    let mut form = PerformanceForm::default();
    let mut staged = Vec::new();

    let input = match collect_form(state, event_id, &mut multipart, &mut form, &mut staged)
        .await
        .and_then(|()| form.into_create())
    {
        Ok(input) => input,
        Err(e) => {
            discard_staged(&staged).await;
            return Err(e);
        }
    };

    Ok(PerformanceRepo::create_with_tracks(&state.store, event_id, &input, &staged).await?)
}

/// Read every part of the form. Files are validated by name and streamed
/// to staging files before the next part is read.
async fn collect_form(
    state: &AppState,
    event_id: &str,
    multipart: &mut Multipart,
    form: &mut PerformanceForm,
    staged: &mut Vec<StagedFile>,
) -> AppResult<()> {
    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "files" | "files[]" | "file" => {
                // Browsers send an empty part for an untouched file input.
                let Some(client_name) = client_filename(&field) else {
                    continue;
                };
                let safe = sanitize_filename(&client_name)
                    .ok_or_else(|| CoreError::Validation(format!("Invalid file name '{client_name}'")))?;
                validate_audio_filename(&safe)?;

                let event_dir = state.store.layout().event_dir(event_id);
                let mut file = create_staging(&event_dir, "track").await?;
                write_field(&mut field, &mut file.file, &file.path).await?;
                staged.push(StagedFile {
                    client_name,
                    path: file.path,
                });
            }
            "name" => form.name = Some(field.text().await?),
            "performer" => form.performer = Some(field.text().await?),
            "type" => form.performance_type = Some(field.text().await?),
            "mode" => form.mode = Some(field.text().await?),
            "expectedDuration" => form.expected_duration = Some(field.text().await?),
            _ => {}
        }
    }
    Ok(())
}
