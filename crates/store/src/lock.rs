//! Cross-process document locking.
//!
//! A document `foo.json` is guarded by an OS advisory lock (`flock` on
//! Unix, `LockFileEx` on Windows) taken on the sibling file `foo.json.lock`.
//! The lock belongs to the open file, so it is visible to other server
//! processes sharing the data directory as well as to other tasks in this
//! one, and the operating system drops it when the holder exits or
//! crashes. A leftover lock file therefore never blocks anyone and there
//! is nothing to reclaim.
//!
//! Lock files are never deleted while the directory lives. Unlinking a
//! lock file that another waiter already opened would let a third party
//! lock a fresh inode at the same path.

use std::fs::TryLockError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::StoreError;

/// Default upper bound on waiting for a contended lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay between acquisition attempts while the lock is held elsewhere.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Extension appended to a document path to name its lock file.
pub const LOCK_SUFFIX: &str = "lock";

/// Tuning for [`DocumentLock::acquire`].
#[derive(Debug, Clone, Copy)]
pub struct LockSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_LOCK_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Path of the lock file guarding `document`.
pub fn lock_path_for(document: &Path) -> PathBuf {
    let mut name = document.as_os_str().to_owned();
    name.push(".");
    name.push(LOCK_SUFFIX);
    PathBuf::from(name)
}

/// Scoped exclusive lock on one document.
///
/// Released when the guard drops: closing the file releases the advisory
/// lock, with no filesystem path operation involved.
#[derive(Debug)]
pub struct DocumentLock {
    path: PathBuf,
    _file: std::fs::File,
}

impl DocumentLock {
    /// Acquire the lock for `document`, waiting at most `settings.timeout`.
    ///
    /// The document's directory must already exist; the lock never creates
    /// directories, so it cannot resurrect a deleted event.
    pub async fn acquire(document: &Path, settings: &LockSettings) -> Result<Self, StoreError> {
        let path = lock_path_for(document);
        let file = tokio::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?
            .into_std()
            .await;

        let started = Instant::now();
        let mut contended = false;

        loop {
            match file.try_lock() {
                Ok(()) => {
                    stamp_owner(&file, &path);
                    if contended {
                        tracing::debug!(
                            lock = %path.display(),
                            waited_ms = started.elapsed().as_millis() as u64,
                            "Acquired contended document lock",
                        );
                    }
                    return Ok(Self { path, _file: file });
                }
                Err(TryLockError::WouldBlock) => {
                    contended = true;
                    let waited = started.elapsed();
                    if waited >= settings.timeout {
                        tracing::warn!(
                            lock = %path.display(),
                            waited_ms = waited.as_millis() as u64,
                            "Timed out waiting for document lock",
                        );
                        return Err(StoreError::LockTimeout { path, waited });
                    }
                    tokio::time::sleep(settings.poll_interval).await;
                }
                Err(TryLockError::Error(e)) => return Err(StoreError::io(&path, e)),
            }
        }
    }

    /// Path of the lock file held by this guard.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Record the holder's pid and start time in the lock file for operators.
/// The lock itself does not depend on the content.
fn stamp_owner(mut file: &std::fs::File, path: &Path) {
    let owner = format!("{} {}\n", std::process::id(), chrono::Utc::now().to_rfc3339());
    let written = file
        .set_len(0)
        .and_then(|()| file.write_all(owner.as_bytes()));
    if let Err(e) = written {
        tracing::debug!(lock = %path.display(), error = %e, "Failed to write lock owner stamp");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
