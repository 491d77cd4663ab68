//! Repository for the events index (`events.json`).

use std::path::Path;

use chrono::Utc;
use perfman_core::error::CoreError;
use perfman_core::media::cover_filename;
use perfman_core::types::new_entity_id;

use crate::document::{self, Modified};
use crate::files::{remove_dir_best_effort, remove_file_best_effort};
use crate::layout::CollectionKind;
use crate::models::event::{CreateEvent, Event, UpdateEvent};
use crate::models::performance::Performance;
use crate::models::schedule_break::Break;
use crate::{Store, StoreError};

/// Provides CRUD operations for events.
pub struct EventRepo;

impl EventRepo {
    /// All events in creation order.
    pub async fn list(store: &Store) -> Vec<Event> {
        store.events().await
    }

    pub async fn find_by_id(store: &Store, id: &str) -> Option<Event> {
        store.find_event(id).await
    }

    /// Create an event together with its directory and empty collections.
    pub async fn create(store: &Store, input: &CreateEvent) -> Result<Event, StoreError> {
        input.validate()?;

        let event = Event {
            id: new_entity_id(),
            name: input.name.clone(),
            description: input.description.clone().unwrap_or_default(),
            created_at: Utc::now(),
            cover_image: None,
            image_position: input.image_position.unwrap_or_default(),
        };

        let layout = store.layout();
        let dir = layout.event_dir(&event.id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;

        let prepared = async {
            document::save::<Performance>(&layout.collection_file(&event.id, CollectionKind::Performances), &[])
                .await?;
            document::save::<Break>(&layout.collection_file(&event.id, CollectionKind::Breaks), &[]).await?;
            Self::modify_index(store, |events| {
                events.push(event.clone());
                Some(())
            })
            .await
        }
        .await;

        if let Err(e) = prepared {
            remove_dir_best_effort(&dir).await;
            return Err(e);
        }

        tracing::info!(event_id = %event.id, name = %event.name, "Event created");
        Ok(event)
    }

    /// Apply a partial update. Returns the event as stored afterwards.
    pub async fn update(store: &Store, id: &str, input: &UpdateEvent) -> Result<Event, StoreError> {
        input.validate()?;
        Self::update_with(store, id, |event| input.apply_to(event)).await
    }

    /// Move a fully written staging file into place as the event's cover
    /// image and record it. A previous cover with a different extension is
    /// removed.
    pub async fn set_cover_image(store: &Store, id: &str, staged: &Path, ext: &str) -> Result<Event, StoreError> {
        let filename = cover_filename(ext);
        let target = store.layout().event_file(id, &filename);

        if let Err(e) = tokio::fs::rename(staged, &target).await {
            remove_file_best_effort(staged).await;
            return Err(StoreError::io(&target, e));
        }

        let mut previous = None;
        let event = Self::update_with(store, id, |event| {
            previous = event.cover_image.replace(filename.clone());
        })
        .await?;

        if let Some(old) = previous.filter(|old| *old != filename) {
            remove_file_best_effort(&store.layout().event_file(id, &old)).await;
        }

        tracing::info!(event_id = %id, cover = %filename, "Cover image stored");
        Ok(event)
    }

    /// Delete an event record, then its directory (best effort).
    pub async fn delete(store: &Store, id: &str) -> Result<(), StoreError> {
        let modified = Self::modify_index(store, |events| {
            events
                .iter()
                .position(|event| event.id == id)
                .map(|index| events.remove(index))
        })
        .await?;
        if modified.outcome.is_none() {
            return Err(CoreError::not_found("Event", id).into());
        }

        remove_dir_best_effort(&store.layout().event_dir(id)).await;
        tracing::info!(event_id = %id, "Event deleted");
        Ok(())
    }

    async fn update_with<F>(store: &Store, id: &str, change: F) -> Result<Event, StoreError>
    where
        F: FnOnce(&mut Event),
    {
        let modified = Self::modify_index(store, |events| {
            events.iter_mut().find(|event| event.id == id).map(|event| {
                change(event);
                event.clone()
            })
        })
        .await?;
        modified
            .outcome
            .ok_or_else(|| CoreError::not_found("Event", id).into())
    }

    /// Locked cycle on `events.json`; the resident index is replaced with
    /// whatever is on disk afterwards, picking up other processes' writes.
    async fn modify_index<R, F>(store: &Store, mutate: F) -> Result<Modified<Event, R>, StoreError>
    where
        F: FnOnce(&mut Vec<Event>) -> Option<R>,
    {
        let modified = document::modify(&store.layout().events_file(), store.lock_settings(), mutate).await?;
        store.replace_events(modified.items.clone()).await;
        Ok(modified)
    }
}
