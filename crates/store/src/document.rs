//! JSON collection documents.
//!
//! Every collection (the events index, one event's performances, one
//! event's breaks) is a single JSON array on disk. Writes replace the whole
//! document through a temp file and an atomic rename, so readers never
//! observe a torn document and no lock is needed to read.
//!
//! Read-modify-write cycles go through [`modify`], which holds the
//! document's [`DocumentLock`] across load, mutation and save.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::lock::{DocumentLock, LockSettings};
use crate::StoreError;

/// Result of reading a document from disk.
enum Read<T> {
    Missing,
    Parsed(Vec<T>),
    Corrupt(serde_json::Error),
}

async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Read<T>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Read::Missing),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    Ok(match serde_json::from_slice(&bytes) {
        Ok(items) => Read::Parsed(items),
        Err(e) => Read::Corrupt(e),
    })
}

/// Load a collection for reading.
///
/// A missing, unreadable or unparsable document yields an empty collection;
/// the failure is logged but never surfaces to the caller.
pub async fn load<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    match read_document(path).await {
        Ok(Read::Parsed(items)) => items,
        Ok(Read::Missing) => Vec::new(),
        Ok(Read::Corrupt(e)) => {
            tracing::warn!(
                document = %path.display(),
                error = %e,
                "Unparsable document treated as empty",
            );
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable document treated as empty");
            Vec::new()
        }
    }
}

/// Load a collection that is about to be rewritten. Caller holds the lock.
///
/// Like [`load`], a corrupt document degrades to empty. Because the next
/// save would overwrite it, the corrupt file is first moved aside to
/// `<name>.corrupt-<unix-seconds>` so an operator can recover it.
async fn load_for_update<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    match read_document(path).await? {
        Read::Parsed(items) => Ok(items),
        Read::Missing => Ok(Vec::new()),
        Read::Corrupt(e) => {
            let quarantine = quarantine_path(path);
            tokio::fs::rename(path, &quarantine)
                .await
                .map_err(|io| StoreError::io(path, io))?;
            tracing::error!(
                document = %path.display(),
                moved_to = %quarantine.display(),
                error = %e,
                "Corrupt document moved aside; continuing with an empty collection",
            );
            Ok(Vec::new())
        }
    }
}

fn quarantine_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".corrupt-{}", chrono::Utc::now().timestamp()));
    PathBuf::from(name)
}

/// Replace the document at `path` with `items`. Caller holds the lock.
///
/// The new content is written to a hidden temp file in the same directory,
/// synced, and renamed over the target.
pub async fn save<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(items).map_err(|source| StoreError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &bytes).await
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let tmp = parent.join(format!(".{file_name}.tmp.{}", uuid::Uuid::new_v4().simple()));

    let written = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(StoreError::io(path, e));
    }

    // Persist the rename itself; best effort on platforms without dir fsync.
    if let Ok(dir) = tokio::fs::File::open(parent).await {
        let _ = dir.sync_all().await;
    }
    Ok(())
}

/// Outcome of a [`modify`] cycle.
#[derive(Debug)]
pub struct Modified<T, R> {
    /// The collection as it stands after the cycle.
    pub items: Vec<T>,
    /// `Some` if the mutation applied (and was saved).
    pub outcome: Option<R>,
}

/// Run one locked read-modify-write cycle against the document at `path`.
///
/// `mutate` receives the freshly loaded collection. Returning `Some` saves
/// the collection; returning `None` leaves the document untouched (target
/// not found). The lock is released when this function returns or its
/// future is dropped.
pub async fn modify<T, R, F>(
    path: &Path,
    settings: &LockSettings,
    mutate: F,
) -> Result<Modified<T, R>, StoreError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut Vec<T>) -> Option<R>,
{
    let _lock = DocumentLock::acquire(path, settings).await?;

    let mut items = load_for_update(path).await?;
    let outcome = mutate(&mut items);
    if outcome.is_some() {
        save(path, &items).await?;
    }

    Ok(Modified { items, outcome })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
