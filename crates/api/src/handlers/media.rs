//! File responses with HTTP range request support.
//!
//! Shared by track streaming and cover images. Browsers seek audio with
//! `Range` requests; each partial response is capped at [`MAX_CHUNK_SIZE`]
//! for open-ended ranges.

use std::path::Path;

use axum::body::Body;
use axum::http::header::{self, HeaderMap};
use axum::http::StatusCode;
use axum::response::Response;
use perfman_core::error::CoreError;
use perfman_core::media::content_type_for;
use perfman_core::range::{resolve_range, RangeRequest};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};

/// Maximum read chunk size for open-ended ranges (1 MiB).
const MAX_CHUNK_SIZE: u64 = 1024 * 1024;

/// Respond with the file at `path`, honouring a single-range `Range` header.
///
/// `entity`/`id` name the file in the 404 raised when it does not exist.
pub async fn serve_file(
    path: &Path,
    headers: &HeaderMap,
    entity: &'static str,
    id: &str,
) -> AppResult<Response> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return Err(CoreError::not_found(entity, id).into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CoreError::not_found(entity, id).into());
        }
        Err(e) => return Err(AppError::InternalError(e.to_string())),
    };
    let file_size = metadata.len();
    let content_type = content_type_for(&path.to_string_lossy());

    let range_header = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let response = match resolve_range(range_header, file_size, MAX_CHUNK_SIZE) {
        RangeRequest::Full => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, file_size)
            .header(header::ACCEPT_RANGES, "bytes")
            .body(Body::from_stream(ReaderStream::new(file))),
        RangeRequest::Partial(range) => {
            file.seek(std::io::SeekFrom::Start(range.start))
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            let limited = file.take(range.len());

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, range.len())
                .header(header::CONTENT_RANGE, range.content_range(file_size))
                .header(header::ACCEPT_RANGES, "bytes")
                .body(Body::from_stream(ReaderStream::new(limited)))
        }
        RangeRequest::Unsatisfiable => Response::builder()
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, format!("bytes */{file_size}"))
            .header(header::ACCEPT_RANGES, "bytes")
            .body(Body::empty()),
    };

    response.map_err(|e| AppError::InternalError(format!("Failed to build response: {e}")))
}
