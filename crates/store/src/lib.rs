//! Filesystem persistence for the performance manager.
//!
//! All state lives under one data directory as JSON documents (see
//! [`layout`]). The [`Store`] handle is created once at startup with
//! [`open_store`] and cloned into every request; repositories in
//! [`repositories`] take it by reference the way SQL repositories take a
//! connection pool.

pub mod document;
pub mod error;
pub mod files;
pub mod layout;
pub mod lock;
pub mod models;
pub mod repositories;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use perfman_core::error::CoreError;
use tokio::sync::RwLock;

pub use error::StoreError;

use crate::layout::DataLayout;
use crate::lock::LockSettings;
use crate::models::event::Event;

/// Tuning knobs for [`open_store`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    pub lock: LockSettings,
}

impl StoreOptions {
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock.timeout = timeout;
        self
    }
}

/// Shared handle to the data directory.
///
/// Cheap to clone. Performance and break collections are always read from
/// disk; only the events index is kept resident, refreshed after every
/// event mutation.
#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    layout: DataLayout,
    lock: LockSettings,
    events: RwLock<Vec<Event>>,
}

/// Open (creating if needed) the data directory at `root` and load the
/// events index.
pub async fn open_store(root: impl Into<PathBuf>, options: StoreOptions) -> Result<Store, StoreError> {
    let layout = DataLayout::new(root);
    tokio::fs::create_dir_all(layout.root())
        .await
        .map_err(|e| StoreError::io(layout.root(), e))?;

    let events: Vec<Event> = document::load(&layout.events_file()).await;
    tracing::info!(
        data_dir = %layout.root().display(),
        event_count = events.len(),
        "Opened data directory",
    );

    Ok(Store {
        inner: Arc::new(StoreInner {
            layout,
            lock: options.lock,
            events: RwLock::new(events),
        }),
    })
}

/// Verify the data directory is still present and writable.
pub async fn health_check(store: &Store) -> Result<(), StoreError> {
    let root = store.root();
    let marker = root.join(format!(".health.{}", uuid::Uuid::new_v4().simple()));
    tokio::fs::write(&marker, b"ok")
        .await
        .map_err(|e| StoreError::io(&marker, e))?;
    tokio::fs::remove_file(&marker)
        .await
        .map_err(|e| StoreError::io(&marker, e))?;
    Ok(())
}

impl Store {
    pub fn root(&self) -> &Path {
        self.inner.layout.root()
    }

    pub fn layout(&self) -> &DataLayout {
        &self.inner.layout
    }

    pub fn lock_settings(&self) -> &LockSettings {
        &self.inner.lock
    }

    /// Snapshot of the resident events index.
    pub(crate) async fn events(&self) -> Vec<Event> {
        self.inner.events.read().await.clone()
    }

    pub(crate) async fn replace_events(&self, events: Vec<Event>) {
        *self.inner.events.write().await = events;
    }

    /// Look up an event, re-reading `events.json` once on a miss so events
    /// created by another process sharing the directory are found too.
    pub(crate) async fn find_event(&self, event_id: &str) -> Option<Event> {
        if let Some(event) = self.lookup_event(event_id).await {
            return Some(event);
        }
        let on_disk: Vec<Event> = document::load(&self.inner.layout.events_file()).await;
        let found = on_disk.iter().find(|e| e.id == event_id).cloned();
        if found.is_some() {
            self.replace_events(on_disk).await;
        }
        found
    }

    async fn lookup_event(&self, event_id: &str) -> Option<Event> {
        self.inner
            .events
            .read()
            .await
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
    }

    /// Fail with `NotFound` unless `event_id` names a known event.
    pub(crate) async fn require_event(&self, event_id: &str) -> Result<Event, StoreError> {
        self.find_event(event_id)
            .await
            .ok_or_else(|| CoreError::not_found("Event", event_id).into())
    }
}
