//! Concurrent writers against shared documents.

mod common;

use std::collections::HashSet;
use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use common::{create_event, temp_store};
use perfman_core::schedule::BreakType;
use perfman_store::lock::{lock_path_for, DocumentLock, LockSettings};
use perfman_store::models::performance::CreatePerformance;
use perfman_store::models::schedule_break::CreateBreak;
use perfman_store::models::track::CreateTrack;
use perfman_store::repositories::{BreakRepo, EventRepo, PerformanceRepo, TrackRepo};
use perfman_store::layout::CollectionKind;
use perfman_store::{open_store, StoreError, StoreOptions};

fn new_performance(name: String) -> CreatePerformance {
    CreatePerformance {
        name,
        performer: None,
        performance_type: None,
        mode: None,
        expected_duration: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_lose_nothing() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Busy night").await;

    let handles: Vec<_> = (0..24)
        .map(|i| {
            let store = store.clone();
            let event_id = event.id.clone();
            tokio::spawn(async move {
                PerformanceRepo::create(&store, &event_id, &new_performance(format!("Act {i}")))
                    .await
                    .unwrap()
                    .id
            })
        })
        .collect();

    let mut created = HashSet::new();
    for handle in handles {
        created.insert(handle.await.unwrap());
    }

    let stored: HashSet<String> = PerformanceRepo::list(&store, &event.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(stored, created);
    assert_eq!(stored.len(), 24);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn separate_store_handles_serialize_on_the_lock_file() {
    // Two handles on one directory stand in for two server processes.
    let (dir, first) = temp_store().await;
    let second = open_store(dir.path(), StoreOptions::default().with_lock_timeout(Duration::from_secs(30)))
        .await
        .unwrap();
    let event = create_event(&first, "Shared").await;

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let store = if i % 2 == 0 { first.clone() } else { second.clone() };
            let event_id = event.id.clone();
            tokio::spawn(async move {
                BreakRepo::create(
                    &store,
                    &event_id,
                    &CreateBreak {
                        name: format!("Break {i}"),
                        break_type: BreakType::Announcement,
                        expected_duration: None,
                    },
                )
                .await
                .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(BreakRepo::list(&first, &event.id).await.unwrap().len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn leftover_lock_file_from_crashed_holder_keeps_writers_exclusive() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "After crash").await;
    let document = store
        .layout()
        .collection_file(&event.id, CollectionKind::Performances);
    std::fs::write(lock_path_for(&document), "4242 2020-01-01T00:00:00Z\n").unwrap();

    // Every create is a full read-modify-write of one document, so any
    // overlap between holders would drop entries.
    let handles: Vec<_> = (0..32)
        .map(|i| {
            let store = store.clone();
            let event_id = event.id.clone();
            tokio::spawn(async move {
                PerformanceRepo::create(&store, &event_id, &new_performance(format!("Act {i}")))
                    .await
                    .unwrap()
                    .id
            })
        })
        .collect();
    let mut created = HashSet::new();
    for handle in handles {
        created.insert(handle.await.unwrap());
    }

    let stored = PerformanceRepo::list(&store, &event.id).await.unwrap();
    assert_eq!(stored.len(), 32);
    assert_eq!(stored.into_iter().map(|p| p.id).collect::<HashSet<_>>(), created);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reorder_racing_with_creates_keeps_all_items() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Race").await;
    let mut seeded = Vec::new();
    for i in 0..5 {
        let p = PerformanceRepo::create(&store, &event.id, &new_performance(format!("Seed {i}")))
            .await
            .unwrap();
        seeded.push(p.id);
    }

    let mut handles = Vec::new();
    for i in 0..10 {
        let store = store.clone();
        let event_id = event.id.clone();
        let subset = vec![seeded[i % 5].clone(), seeded[(i + 2) % 5].clone()];
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                PerformanceRepo::reorder(&store, &event_id, &subset).await.unwrap();
            } else {
                PerformanceRepo::create(&store, &event_id, &new_performance(format!("Late {i}")))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(PerformanceRepo::list(&store, &event.id).await.unwrap().len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_event_creates_all_land_in_index() {
    let (dir, store) = temp_store().await;

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { create_event(&store, &format!("Event {i}")).await.id })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(EventRepo::list(&store).await.len(), 12);
    let reopened = open_store(dir.path(), StoreOptions::default()).await.unwrap();
    assert_eq!(EventRepo::list(&reopened).await.len(), 12);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn identical_uploads_get_distinct_files_and_tracks() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Uploads").await;
    let perf = PerformanceRepo::create(&store, &event.id, &new_performance("Act".into()))
        .await
        .unwrap();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let store = store.clone();
            let event_id = event.id.clone();
            let perf_id = perf.id.clone();
            tokio::spawn(async move {
                let claimed = TrackRepo::claim_file(&store, &event_id, &perf_id, "song.mp3")
                    .await
                    .unwrap();
                TrackRepo::create(
                    &store,
                    &event_id,
                    &perf_id,
                    &CreateTrack {
                        filename: claimed.filename,
                        performer: "Unknown".into(),
                    },
                )
                .await
                .unwrap()
            })
        })
        .collect();

    let mut filenames = Vec::new();
    for handle in handles {
        filenames.push(handle.await.unwrap().filename);
    }
    filenames.sort();
    assert_eq!(filenames, vec!["song.mp3".to_string(), "song_1.mp3".to_string()]);

    let stored = PerformanceRepo::find_by_id(&store, &event.id, &perf.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.tracks.len(), 2);
    let dir = store.layout().performance_dir(&event.id, &perf.id);
    assert!(dir.join("song.mp3").exists());
    assert!(dir.join("song_1.mp3").exists());
}

#[tokio::test]
async fn held_lock_times_out_writers() {
    let (dir, _) = temp_store().await;
    let impatient = open_store(
        dir.path(),
        StoreOptions::default().with_lock_timeout(Duration::from_millis(100)),
    )
    .await
    .unwrap();
    let event = create_event(&impatient, "Locked").await;

    let document = impatient
        .layout()
        .collection_file(&event.id, CollectionKind::Performances);
    let _held = DocumentLock::acquire(&document, &LockSettings::default()).await.unwrap();

    let started = Instant::now();
    let result = PerformanceRepo::create(&impatient, &event.id, &new_performance("Blocked".into())).await;
    assert_matches!(result, Err(StoreError::LockTimeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));

    // Another event's documents are unaffected.
    let other = create_event(&impatient, "Free").await;
    assert!(PerformanceRepo::create(&impatient, &other.id, &new_performance("Open".into()))
        .await
        .is_ok());
}
