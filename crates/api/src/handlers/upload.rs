//! Streaming multipart file fields to disk.

use std::path::Path;

use axum::extract::multipart::Field;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, AppResult};

/// Copy `field` into `file` chunk by chunk, then flush and sync.
///
/// On failure the partially written file at `path` is removed.
pub async fn write_field(field: &mut Field<'_>, file: &mut tokio::fs::File, path: &Path) -> AppResult<u64> {
    let written = copy_chunks(field, file).await;
    if written.is_err() {
        perfman_store::files::remove_file_best_effort(path).await;
    }
    written
}

async fn copy_chunks(field: &mut Field<'_>, file: &mut tokio::fs::File) -> AppResult<u64> {
    let mut total = 0u64;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to write upload: {e}")))?;
        total += chunk.len() as u64;
    }
    file.sync_all()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to sync upload: {e}")))?;
    Ok(total)
}

/// The client-supplied file name of a field, or `None` when the browser
/// sent an empty file input.
pub fn client_filename(field: &Field<'_>) -> Option<String> {
    field
        .file_name()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
