#![allow(dead_code)]

use std::time::Duration;

use chrono::Utc;
use perfman_store::document;
use perfman_store::layout::CollectionKind;
use perfman_store::models::event::{CreateEvent, Event};
use perfman_store::models::performance::Performance;
use perfman_store::models::schedule_break::Break;
use perfman_store::repositories::EventRepo;
use perfman_store::{open_store, Store, StoreOptions};
use perfman_core::schedule::BreakType;
use tempfile::TempDir;

/// A store rooted in a fresh temp directory. Keep the `TempDir` alive for
/// the duration of the test.
pub async fn temp_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let options = StoreOptions::default().with_lock_timeout(Duration::from_secs(30));
    let store = open_store(dir.path(), options).await.expect("open store");
    (dir, store)
}

pub async fn create_event(store: &Store, name: &str) -> Event {
    EventRepo::create(
        store,
        &CreateEvent {
            name: name.to_string(),
            description: None,
            image_position: None,
        },
    )
    .await
    .expect("create event")
}

pub fn performance(id: &str, order: i64) -> Performance {
    Performance {
        id: id.to_string(),
        name: format!("Act {id}"),
        performer: String::new(),
        performance_type: "Song".to_string(),
        mode: "Solo".to_string(),
        tracks: Vec::new(),
        is_done: false,
        created_at: Utc::now(),
        order,
        expected_duration: None,
    }
}

pub fn schedule_break(id: &str, order: i64) -> Break {
    Break {
        id: id.to_string(),
        name: format!("Break {id}"),
        break_type: BreakType::Lunch,
        is_done: false,
        created_at: Utc::now(),
        order,
        expected_duration: None,
    }
}

/// Overwrite an event's performances with `perf-1..=perf-n` (order 0..n).
pub async fn seed_performances(store: &Store, event_id: &str, n: usize) {
    let items: Vec<Performance> = (1..=n)
        .map(|i| performance(&format!("perf-{i}"), i as i64 - 1))
        .collect();
    let path = store.layout().collection_file(event_id, CollectionKind::Performances);
    document::save(&path, &items).await.expect("seed performances");
}

/// Raw stored performances, in document order.
pub async fn stored_performances(store: &Store, event_id: &str) -> Vec<Performance> {
    document::load(&store.layout().collection_file(event_id, CollectionKind::Performances)).await
}

pub fn order_of(items: &[Performance], id: &str) -> i64 {
    items
        .iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| panic!("{id} missing"))
        .order
}
