//! Repository for an event's breaks (`<event_id>/breaks.json`).

use chrono::Utc;
use perfman_core::reorder::ReorderSummary;
use perfman_core::types::new_entity_id;

use crate::layout::CollectionKind;
use crate::models::schedule_break::{Break, CreateBreak, UpdateBreak};
use crate::repositories::collection;
use crate::{Store, StoreError};

const KIND: CollectionKind = CollectionKind::Breaks;

/// Provides CRUD and reorder operations for breaks.
pub struct BreakRepo;

impl BreakRepo {
    pub async fn list(store: &Store, event_id: &str) -> Result<Vec<Break>, StoreError> {
        collection::list(store, event_id, KIND).await
    }

    pub async fn find_by_id(store: &Store, event_id: &str, id: &str) -> Result<Option<Break>, StoreError> {
        collection::find(store, event_id, KIND, id).await
    }

    pub async fn create(store: &Store, event_id: &str, input: &CreateBreak) -> Result<Break, StoreError> {
        input.validate()?;
        let created = collection::insert(store, event_id, KIND, |order| Break {
            id: new_entity_id(),
            name: input.name.clone(),
            break_type: input.break_type,
            is_done: false,
            created_at: Utc::now(),
            order,
            expected_duration: input.expected_duration,
        })
        .await?;

        tracing::info!(
            event_id,
            break_id = %created.id,
            break_type = created.break_type.label(),
            "Break created",
        );
        Ok(created)
    }

    pub async fn update(
        store: &Store,
        event_id: &str,
        id: &str,
        input: &UpdateBreak,
    ) -> Result<Break, StoreError> {
        input.validate()?;
        collection::update(store, event_id, KIND, id, |item: &mut Break| input.apply_to(item)).await
    }

    pub async fn delete(store: &Store, event_id: &str, id: &str) -> Result<Break, StoreError> {
        let removed: Break = collection::remove(store, event_id, KIND, id).await?;
        tracing::info!(event_id, break_id = %id, "Break deleted");
        Ok(removed)
    }

    /// Same partial-reorder contract as performances.
    pub async fn reorder(store: &Store, event_id: &str, ids: &[String]) -> Result<ReorderSummary, StoreError> {
        collection::reorder::<Break>(store, event_id, KIND, ids).await
    }
}
