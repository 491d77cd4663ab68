//! Repository for an event's performances (`<event_id>/performances.json`).

use chrono::Utc;
use perfman_core::error::CoreError;
use perfman_core::reorder::ReorderSummary;
use perfman_core::schedule::{DEFAULT_PERFORMANCE_MODE, DEFAULT_PERFORMANCE_TYPE, DEFAULT_TRACK_PERFORMER};
use perfman_core::types::new_entity_id;

use crate::files::{discard_staged, remove_dir_best_effort, StagedFile};
use crate::layout::CollectionKind;
use crate::models::performance::{CreatePerformance, Performance, UpdatePerformance};
use crate::repositories::{collection, TrackRepo};
use crate::{Store, StoreError};

const KIND: CollectionKind = CollectionKind::Performances;

/// Provides CRUD and reorder operations for performances.
pub struct PerformanceRepo;

impl PerformanceRepo {
    /// List an event's performances sorted by `order`.
    pub async fn list(store: &Store, event_id: &str) -> Result<Vec<Performance>, StoreError> {
        collection::list(store, event_id, KIND).await
    }

    pub async fn find_by_id(
        store: &Store,
        event_id: &str,
        id: &str,
    ) -> Result<Option<Performance>, StoreError> {
        collection::find(store, event_id, KIND, id).await
    }

    /// Create a performance (no tracks yet) and its media directory.
    ///
    /// Only the performance directory itself is created. If the event
    /// directory is gone the event counts as deleted and nothing is written.
    pub async fn create(
        store: &Store,
        event_id: &str,
        input: &CreatePerformance,
    ) -> Result<Performance, StoreError> {
        input.validate()?;
        store.require_event(event_id).await?;

        let id = new_entity_id();
        let dir = store.layout().performance_dir(event_id, &id);
        tokio::fs::create_dir(&dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::from(CoreError::not_found("Event", event_id))
            } else {
                StoreError::io(&dir, e)
            }
        })?;

        let inserted = collection::insert(store, event_id, KIND, |order| Performance {
            id: id.clone(),
            name: input.name.clone(),
            performer: input.performer.clone().unwrap_or_default(),
            performance_type: input
                .performance_type
                .clone()
                .unwrap_or_else(|| DEFAULT_PERFORMANCE_TYPE.to_string()),
            mode: input
                .mode
                .clone()
                .unwrap_or_else(|| DEFAULT_PERFORMANCE_MODE.to_string()),
            tracks: Vec::new(),
            is_done: false,
            created_at: Utc::now(),
            order,
            expected_duration: input.expected_duration,
        })
        .await;

        match inserted {
            Ok(performance) => {
                tracing::info!(
                    event_id,
                    performance_id = %performance.id,
                    order = performance.order,
                    "Performance created",
                );
                Ok(performance)
            }
            Err(e) => {
                remove_dir_best_effort(&dir).await;
                Err(e)
            }
        }
    }

    /// Create a performance and attach each staged upload as a track.
    ///
    /// All or nothing: if any file cannot be attached, the performance is
    /// deleted again (removing the tracks already moved into its directory)
    /// and every staged file not yet consumed is discarded. Tracks are
    /// credited to the performance's performer, or
    /// [`DEFAULT_TRACK_PERFORMER`] when that is blank.
    pub async fn create_with_tracks(
        store: &Store,
        event_id: &str,
        input: &CreatePerformance,
        staged: &[StagedFile],
    ) -> Result<Performance, StoreError> {
        let performance = match Self::create(store, event_id, input).await {
            Ok(performance) => performance,
            Err(e) => {
                discard_staged(staged).await;
                return Err(e);
            }
        };

        let performer = match performance.performer.trim() {
            "" => DEFAULT_TRACK_PERFORMER,
            named => named,
        };

        for (index, file) in staged.iter().enumerate() {
            let attached = TrackRepo::create_from_staged(
                store,
                event_id,
                &performance.id,
                &file.client_name,
                &file.path,
                performer,
            )
            .await;
            if let Err(e) = attached {
                discard_staged(&staged[index + 1..]).await;
                tracing::warn!(
                    event_id,
                    performance_id = %performance.id,
                    file = %file.client_name,
                    error = %e,
                    "Track attach failed; rolling back performance",
                );
                if let Err(rollback) = Self::delete(store, event_id, &performance.id).await {
                    tracing::error!(
                        event_id,
                        performance_id = %performance.id,
                        error = %rollback,
                        "Failed to roll back partially created performance",
                    );
                }
                return Err(e);
            }
        }

        Self::find_by_id(store, event_id, &performance.id)
            .await?
            .ok_or_else(|| CoreError::not_found("Performance", &performance.id).into())
    }

    /// Apply a bounded partial update.
    pub async fn update(
        store: &Store,
        event_id: &str,
        id: &str,
        input: &UpdatePerformance,
    ) -> Result<Performance, StoreError> {
        input.validate()?;
        collection::update(store, event_id, KIND, id, |performance: &mut Performance| {
            input.apply_to(performance)
        })
        .await
    }

    /// Delete a performance record, then its media directory (best effort).
    pub async fn delete(store: &Store, event_id: &str, id: &str) -> Result<Performance, StoreError> {
        let removed: Performance = collection::remove(store, event_id, KIND, id).await?;
        remove_dir_best_effort(&store.layout().performance_dir(event_id, id)).await;
        tracing::info!(
            event_id,
            performance_id = %id,
            tracks = removed.tracks.len(),
            "Performance deleted",
        );
        Ok(removed)
    }

    /// Assign `order` to the listed performances; others are untouched.
    pub async fn reorder(
        store: &Store,
        event_id: &str,
        ids: &[String],
    ) -> Result<ReorderSummary, StoreError> {
        collection::reorder::<Performance>(store, event_id, KIND, ids).await
    }
}
