//! Media files owned by events and performances.
//!
//! Uploads claim their final name with an exclusive create, so the
//! existence check and the claim are one atomic step: two concurrent
//! uploads of `song.mp3` end up as `song.mp3` and `song_1.mp3`. Claiming
//! and writing happen without any document lock held.

use std::path::{Path, PathBuf};

use perfman_core::error::CoreError;
use perfman_core::naming::{collision_candidate, MAX_COLLISION_SUFFIX};

use crate::StoreError;

/// A freshly created, empty file reserved for an upload.
#[derive(Debug)]
pub struct ClaimedFile {
    /// Final file name (possibly suffixed).
    pub filename: String,
    pub path: PathBuf,
    pub file: tokio::fs::File,
}

/// Create a new file in `dir` named `filename`, or the first free
/// `stem_N.ext` variant. Every candidate is checked against the filesystem.
pub async fn claim_unique(dir: &Path, filename: &str) -> Result<ClaimedFile, StoreError> {
    for attempt in 0..=MAX_COLLISION_SUFFIX {
        let candidate = collision_candidate(filename, attempt);
        let path = dir.join(&candidate);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => {
                if attempt > 0 {
                    tracing::debug!(
                        requested = filename,
                        stored = %candidate,
                        "Upload name collided; stored with suffix",
                    );
                }
                return Ok(ClaimedFile {
                    filename: candidate,
                    path,
                    file,
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(StoreError::io(&path, e)),
        }
    }
    Err(CoreError::Conflict(format!(
        "No free file name for '{filename}' after {MAX_COLLISION_SUFFIX} attempts"
    ))
    .into())
}

/// Create a hidden scratch file in `dir` for content that replaces a fixed
/// name once complete (the event cover image).
pub async fn create_staging(dir: &Path, label: &str) -> Result<ClaimedFile, StoreError> {
    let filename = format!(".{label}.upload.{}", uuid::Uuid::new_v4().simple());
    let path = dir.join(&filename);
    let file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| StoreError::io(&path, e))?;
    Ok(ClaimedFile {
        filename,
        path,
        file,
    })
}

/// A fully written upload parked in the event directory until the
/// performance it belongs to exists.
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Name as sent by the client, before sanitizing.
    pub client_name: String,
    pub path: PathBuf,
}

/// Remove staged uploads that will not be attached.
pub async fn discard_staged(staged: &[StagedFile]) {
    for file in staged {
        remove_file_best_effort(&file.path).await;
    }
}

/// Remove a file, logging instead of failing. Missing files are fine.
pub async fn remove_file_best_effort(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove file");
        }
    }
}

/// Remove a directory tree, logging instead of failing.
pub async fn remove_dir_best_effort(path: &Path) {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove directory");
        }
    }
}
