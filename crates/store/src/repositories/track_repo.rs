//! Repository for tracks embedded in performances.
//!
//! A track upload happens in two steps. [`TrackRepo::claim_file`] reserves a
//! unique file name in the performance directory and hands back an open
//! file; the caller streams the upload into it without holding any
//! document lock. [`TrackRepo::create`] then records the track under the
//! performances document lock.

use std::path::{Path, PathBuf};

use perfman_core::error::CoreError;
use perfman_core::media::validate_audio_filename;
use perfman_core::naming::sanitize_filename;
use perfman_core::types::new_entity_id;

use crate::files::{claim_unique, remove_file_best_effort, ClaimedFile};
use crate::layout::{track_url, CollectionKind};
use crate::models::performance::Performance;
use crate::models::track::{CreateTrack, Track};
use crate::repositories::collection;
use crate::{Store, StoreError};

const KIND: CollectionKind = CollectionKind::Performances;

/// Provides track upload, completion and deletion.
pub struct TrackRepo;

impl TrackRepo {
    /// Reserve a file for an upload named `raw_filename` by the client.
    ///
    /// The name is sanitized and must carry an allowed audio extension.
    /// The performance and its directory must exist; a missing directory
    /// means the performance was deleted and is never recreated here.
    pub async fn claim_file(
        store: &Store,
        event_id: &str,
        performance_id: &str,
        raw_filename: &str,
    ) -> Result<ClaimedFile, StoreError> {
        let filename = sanitize_filename(raw_filename)
            .ok_or_else(|| CoreError::Validation(format!("Invalid file name '{raw_filename}'")))?;
        validate_audio_filename(&filename)?;

        Self::require_performance(store, event_id, performance_id).await?;

        let dir = store.layout().performance_dir(event_id, performance_id);
        claim_unique(&dir, &filename).await.map_err(|e| {
            if e.is_missing_path() {
                CoreError::not_found("Performance", performance_id).into()
            } else {
                e
            }
        })
    }

    /// Record an already-written file as a new track.
    ///
    /// If the record cannot be written (performance deleted meanwhile, lock
    /// timeout, ...) the file is removed so no orphan is left behind.
    pub async fn create(
        store: &Store,
        event_id: &str,
        performance_id: &str,
        input: &CreateTrack,
    ) -> Result<Track, StoreError> {
        let track = Track {
            id: new_entity_id(),
            filename: input.filename.clone(),
            performer: input.performer.clone(),
            url: track_url(event_id, performance_id, &input.filename),
            is_completed: false,
        };

        let recorded = collection::modify(store, event_id, KIND, |performances: &mut Vec<Performance>| {
            performances
                .iter_mut()
                .find(|p| p.id == performance_id)
                .map(|p| p.tracks.push(track.clone()))
        })
        .await
        .and_then(|modified| {
            modified
                .outcome
                .ok_or_else(|| CoreError::not_found("Performance", performance_id).into())
        });

        if let Err(e) = recorded {
            let path = store.layout().track_file(event_id, performance_id, &input.filename);
            tracing::warn!(
                event_id,
                performance_id,
                file = %path.display(),
                error = %e,
                "Track record failed; removing uploaded file",
            );
            remove_file_best_effort(&path).await;
            return Err(e);
        }

        tracing::info!(
            event_id,
            performance_id,
            track_id = %track.id,
            filename = %track.filename,
            "Track added",
        );
        Ok(track)
    }

    /// Move a fully written staging file into the performance directory
    /// under a unique name derived from `raw_filename`, then record it.
    ///
    /// Used when files arrive before the performance they belong to exists.
    /// The staging file is consumed on success and removed on failure.
    pub async fn create_from_staged(
        store: &Store,
        event_id: &str,
        performance_id: &str,
        raw_filename: &str,
        staged: &Path,
        performer: &str,
    ) -> Result<Track, StoreError> {
        let claimed = match Self::claim_file(store, event_id, performance_id, raw_filename).await {
            Ok(claimed) => claimed,
            Err(e) => {
                remove_file_best_effort(staged).await;
                return Err(e);
            }
        };
        let ClaimedFile { filename, path, file } = claimed;
        drop(file);

        if let Err(e) = tokio::fs::rename(staged, &path).await {
            remove_file_best_effort(staged).await;
            remove_file_best_effort(&path).await;
            return Err(StoreError::io(&path, e));
        }

        Self::create(
            store,
            event_id,
            performance_id,
            &CreateTrack {
                filename,
                performer: performer.to_string(),
            },
        )
        .await
    }

    /// Set a track's completion flag.
    pub async fn set_completion(
        store: &Store,
        event_id: &str,
        performance_id: &str,
        track_id: &str,
        is_completed: bool,
    ) -> Result<Track, StoreError> {
        let modified = collection::modify(store, event_id, KIND, |performances: &mut Vec<Performance>| {
            performances
                .iter_mut()
                .find(|p| p.id == performance_id)?
                .tracks
                .iter_mut()
                .find(|t| t.id == track_id)
                .map(|t| {
                    t.is_completed = is_completed;
                    t.clone()
                })
        })
        .await?;

        match modified.outcome {
            Some(track) => Ok(track),
            None => Err(missing_track(&modified.items, performance_id, track_id).into()),
        }
    }

    /// Delete a track record, then its file (best effort).
    pub async fn delete(
        store: &Store,
        event_id: &str,
        performance_id: &str,
        track_id: &str,
    ) -> Result<Track, StoreError> {
        let modified = collection::modify(store, event_id, KIND, |performances: &mut Vec<Performance>| {
            let tracks = &mut performances.iter_mut().find(|p| p.id == performance_id)?.tracks;
            let index = tracks.iter().position(|t| t.id == track_id)?;
            Some(tracks.remove(index))
        })
        .await?;

        let Some(track) = modified.outcome else {
            return Err(missing_track(&modified.items, performance_id, track_id).into());
        };

        remove_file_best_effort(&store.layout().track_file(event_id, performance_id, &track.filename)).await;
        tracing::info!(event_id, performance_id, track_id, "Track deleted");
        Ok(track)
    }

    /// Resolve the on-disk path of a stored track file for streaming.
    ///
    /// `filename` comes from the URL and is sanitized the same way uploads
    /// are, so it cannot escape the performance directory. The file itself
    /// may still be missing; the caller checks.
    pub async fn file_path(
        store: &Store,
        event_id: &str,
        performance_id: &str,
        filename: &str,
    ) -> Result<PathBuf, StoreError> {
        Self::require_performance(store, event_id, performance_id).await?;
        let safe = sanitize_filename(filename).ok_or_else(|| CoreError::not_found("File", filename))?;
        Ok(store.layout().track_file(event_id, performance_id, &safe))
    }

    async fn require_performance(
        store: &Store,
        event_id: &str,
        performance_id: &str,
    ) -> Result<Performance, StoreError> {
        collection::find(store, event_id, KIND, performance_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Performance", performance_id).into())
    }
}

/// Which of performance or track was missing after a failed lookup.
fn missing_track(performances: &[Performance], performance_id: &str, track_id: &str) -> CoreError {
    if performances.iter().any(|p| p.id == performance_id) {
        CoreError::not_found("Track", track_id)
    } else {
        CoreError::not_found("Performance", performance_id)
    }
}
