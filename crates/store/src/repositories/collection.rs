//! Generic operations over one event's performance or break collection.
//!
//! Every mutation is a single locked read-modify-write cycle (see
//! [`document::modify`]); reads are lock-free.

use perfman_core::error::CoreError;
use perfman_core::reorder::{apply_partial_order, next_order, sort_by_order, Ordered, ReorderSummary};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::{self, Modified};
use crate::layout::CollectionKind;
use crate::{Store, StoreError};

/// All items of the collection, sorted by `order` (ties keep stored order).
pub(crate) async fn list<T>(store: &Store, event_id: &str, kind: CollectionKind) -> Result<Vec<T>, StoreError>
where
    T: Ordered + DeserializeOwned,
{
    store.require_event(event_id).await?;
    let mut items: Vec<T> = document::load(&store.layout().collection_file(event_id, kind)).await;
    sort_by_order(&mut items);
    Ok(items)
}

pub(crate) async fn find<T>(
    store: &Store,
    event_id: &str,
    kind: CollectionKind,
    item_id: &str,
) -> Result<Option<T>, StoreError>
where
    T: Ordered + DeserializeOwned,
{
    store.require_event(event_id).await?;
    let items: Vec<T> = document::load(&store.layout().collection_file(event_id, kind)).await;
    Ok(items.into_iter().find(|item| item.id() == item_id))
}

/// Locked read-modify-write against the collection of a known event.
///
/// The event directory vanishing mid-flight (concurrent event delete)
/// surfaces as the event not being found rather than an I/O error.
pub(crate) async fn modify<T, R, F>(
    store: &Store,
    event_id: &str,
    kind: CollectionKind,
    mutate: F,
) -> Result<Modified<T, R>, StoreError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut Vec<T>) -> Option<R>,
{
    store.require_event(event_id).await?;
    let path = store.layout().collection_file(event_id, kind);
    document::modify(&path, store.lock_settings(), mutate)
        .await
        .map_err(|e| match e {
            StoreError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                CoreError::not_found("Event", event_id).into()
            }
            other => other,
        })
}

/// Append a new item built from the next free `order` value.
pub(crate) async fn insert<T, F>(
    store: &Store,
    event_id: &str,
    kind: CollectionKind,
    build: F,
) -> Result<T, StoreError>
where
    T: Ordered + Clone + Serialize + DeserializeOwned,
    F: FnOnce(i64) -> T,
{
    let modified = modify(store, event_id, kind, |items: &mut Vec<T>| {
        let item = build(next_order(items));
        items.push(item.clone());
        Some(item)
    })
    .await?;
    modified
        .outcome
        .ok_or_else(|| CoreError::Internal(format!("{} insert was not applied", kind.entity())).into())
}

/// Apply `change` to the item with `item_id` and return its new state.
pub(crate) async fn update<T, F>(
    store: &Store,
    event_id: &str,
    kind: CollectionKind,
    item_id: &str,
    change: F,
) -> Result<T, StoreError>
where
    T: Ordered + Clone + Serialize + DeserializeOwned,
    F: FnOnce(&mut T),
{
    let modified = modify(store, event_id, kind, |items: &mut Vec<T>| {
        items.iter_mut().find(|item| item.id() == item_id).map(|item| {
            change(item);
            item.clone()
        })
    })
    .await?;
    modified
        .outcome
        .ok_or_else(|| CoreError::not_found(kind.entity(), item_id).into())
}

/// Remove the item with `item_id`, returning it.
pub(crate) async fn remove<T>(
    store: &Store,
    event_id: &str,
    kind: CollectionKind,
    item_id: &str,
) -> Result<T, StoreError>
where
    T: Ordered + Serialize + DeserializeOwned,
{
    let modified = modify(store, event_id, kind, |items: &mut Vec<T>| {
        items
            .iter()
            .position(|item| item.id() == item_id)
            .map(|index| items.remove(index))
    })
    .await?;
    modified
        .outcome
        .ok_or_else(|| CoreError::not_found(kind.entity(), item_id).into())
}

/// Renumber the listed items; everything else keeps its `order`.
pub(crate) async fn reorder<T>(
    store: &Store,
    event_id: &str,
    kind: CollectionKind,
    ids: &[String],
) -> Result<ReorderSummary, StoreError>
where
    T: Ordered + Serialize + DeserializeOwned,
{
    let modified = modify(store, event_id, kind, |items: &mut Vec<T>| {
        Some(apply_partial_order(items, ids))
    })
    .await?;
    let summary = modified.outcome.unwrap_or_default();

    tracing::info!(
        event_id,
        collection = kind.file_name(),
        total = modified.items.len(),
        reordered = summary.reordered,
        ignored = summary.ignored,
        "Collection reordered",
    );
    Ok(summary)
}
