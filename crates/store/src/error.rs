use std::path::{Path, PathBuf};
use std::time::Duration;

use perfman_core::error::CoreError;

/// Errors raised by the filesystem store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain-level error from `perfman_core` (missing parent, bad input).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Filesystem failure (disk full, permission denied, ...).
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection could not be serialized for writing.
    #[error("Failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document lock could not be acquired within the configured bound.
    #[error("Timed out after {waited:?} waiting for lock on {}", path.display())]
    LockTimeout { path: PathBuf, waited: Duration },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for an I/O error caused by a missing file or directory.
    pub(crate) fn is_missing_path(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
