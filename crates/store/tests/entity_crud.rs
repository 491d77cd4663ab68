//! Event, performance, break and track lifecycle against a temp data dir.

mod common;

use assert_matches::assert_matches;
use common::{create_event, temp_store};
use perfman_core::error::CoreError;
use perfman_core::schedule::{BreakType, ImagePosition};
use perfman_store::files::StagedFile;
use perfman_store::models::event::{CreateEvent, UpdateEvent};
use perfman_store::models::performance::{CreatePerformance, UpdatePerformance};
use perfman_store::models::schedule_break::{CreateBreak, UpdateBreak};
use perfman_store::models::track::CreateTrack;
use perfman_store::repositories::{BreakRepo, EventRepo, PerformanceRepo, TrackRepo};
use perfman_store::{open_store, StoreError, StoreOptions};
use tokio::io::AsyncWriteExt;

fn new_performance(name: &str) -> CreatePerformance {
    CreatePerformance {
        name: name.to_string(),
        performer: None,
        performance_type: None,
        mode: None,
        expected_duration: None,
    }
}

#[tokio::test]
async fn event_create_lays_out_directory() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Winter Showcase").await;

    let layout = store.layout();
    assert!(layout.event_dir(&event.id).is_dir());
    assert!(layout.events_file().is_file());
    assert_eq!(event.image_position, ImagePosition::default());
    assert_eq!(EventRepo::list(&store).await.len(), 1);
}

#[tokio::test]
async fn event_survives_reopen() {
    let (dir, store) = temp_store().await;
    let event = create_event(&store, "Persisted").await;
    drop(store);

    let reopened = open_store(dir.path(), StoreOptions::default()).await.unwrap();
    let found = EventRepo::find_by_id(&reopened, &event.id).await.unwrap();
    assert_eq!(found.name, "Persisted");
}

#[tokio::test]
async fn event_created_by_another_handle_is_found() {
    let (dir, store) = temp_store().await;
    let other = open_store(dir.path(), StoreOptions::default()).await.unwrap();

    let event = create_event(&other, "Elsewhere").await;
    assert!(EventRepo::find_by_id(&store, &event.id).await.is_some());
}

#[tokio::test]
async fn event_update_merges_fields() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Draft").await;

    let updated = EventRepo::update(
        &store,
        &event.id,
        &UpdateEvent {
            name: Some("Final".into()),
            description: None,
            image_position: Some(ImagePosition { x: 10.0, y: 90.0 }),
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Final");
    assert_eq!(updated.created_at, event.created_at);
    assert_eq!(updated.image_position, ImagePosition { x: 10.0, y: 90.0 });
}

#[tokio::test]
async fn event_validation_rejects_before_write() {
    let (_dir, store) = temp_store().await;

    let result = EventRepo::create(
        &store,
        &CreateEvent {
            name: "   ".into(),
            description: None,
            image_position: None,
        },
    )
    .await;
    assert_matches!(result, Err(StoreError::Core(CoreError::Validation(_))));
    assert!(EventRepo::list(&store).await.is_empty());
}

#[tokio::test]
async fn event_delete_removes_directory() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Gone").await;
    let dir = store.layout().event_dir(&event.id);

    EventRepo::delete(&store, &event.id).await.unwrap();

    assert!(!dir.exists());
    assert!(EventRepo::find_by_id(&store, &event.id).await.is_none());
    assert_matches!(
        EventRepo::delete(&store, &event.id).await,
        Err(StoreError::Core(CoreError::NotFound { .. }))
    );
}

#[tokio::test]
async fn cover_image_replaces_previous_file() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Covered").await;
    let dir = store.layout().event_dir(&event.id);

    let first = dir.join(".staged-1");
    std::fs::write(&first, b"png").unwrap();
    EventRepo::set_cover_image(&store, &event.id, &first, "png").await.unwrap();

    let second = dir.join(".staged-2");
    std::fs::write(&second, b"jpg").unwrap();
    let updated = EventRepo::set_cover_image(&store, &event.id, &second, "jpg").await.unwrap();

    assert_eq!(updated.cover_image.as_deref(), Some("cover.jpg"));
    assert!(dir.join("cover.jpg").exists());
    assert!(!dir.join("cover.png").exists());
}

#[tokio::test]
async fn performance_defaults_and_order() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Show").await;

    let first = PerformanceRepo::create(&store, &event.id, &new_performance("Opening"))
        .await
        .unwrap();
    let second = PerformanceRepo::create(&store, &event.id, &new_performance("Closing"))
        .await
        .unwrap();

    assert_eq!(first.performance_type, "Song");
    assert_eq!(first.mode, "Solo");
    assert_eq!(first.order, 0);
    assert_eq!(second.order, 1);
    assert!(store.layout().performance_dir(&event.id, &first.id).is_dir());
}

#[tokio::test]
async fn performance_for_unknown_event_is_not_found() {
    let (_dir, store) = temp_store().await;

    let result = PerformanceRepo::create(&store, "missing", &new_performance("Solo")).await;
    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::NotFound { entity: "Event", .. }))
    );
}

#[tokio::test]
async fn performance_create_does_not_resurrect_deleted_event_dir() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Gone").await;
    let event_dir = store.layout().event_dir(&event.id);
    // Directory removed while the index still lists the event, as during
    // a concurrent event delete.
    std::fs::remove_dir_all(&event_dir).unwrap();

    let result = PerformanceRepo::create(&store, &event.id, &new_performance("Late")).await;

    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::NotFound { entity: "Event", .. }))
    );
    assert!(!event_dir.exists());
}

#[tokio::test]
async fn performance_update_is_bounded_merge() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Show").await;
    let created = PerformanceRepo::create(
        &store,
        &event.id,
        &CreatePerformance {
            expected_duration: Some(180),
            ..new_performance("Duet")
        },
    )
    .await
    .unwrap();

    let updated = PerformanceRepo::update(
        &store,
        &event.id,
        &created.id,
        &UpdatePerformance {
            is_done: Some(true),
            expected_duration: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(updated.is_done);
    assert_eq!(updated.expected_duration, None);
    assert_eq!(updated.name, "Duet");
    assert_eq!(updated.id, created.id);
}

#[tokio::test]
async fn performance_delete_removes_media() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Show").await;
    let perf = PerformanceRepo::create(&store, &event.id, &new_performance("Act"))
        .await
        .unwrap();
    let dir = store.layout().performance_dir(&event.id, &perf.id);
    std::fs::write(dir.join("take.mp3"), b"audio").unwrap();

    PerformanceRepo::delete(&store, &event.id, &perf.id).await.unwrap();

    assert!(!dir.exists());
    assert!(PerformanceRepo::list(&store, &event.id).await.unwrap().is_empty());
    assert_matches!(
        PerformanceRepo::delete(&store, &event.id, &perf.id).await,
        Err(StoreError::Core(CoreError::NotFound { entity: "Performance", .. }))
    );
}

fn stage(dir: &std::path::Path, client_name: &str, data: &[u8]) -> StagedFile {
    let path = dir.join(format!(".track.upload.{client_name}"));
    std::fs::write(&path, data).unwrap();
    StagedFile {
        client_name: client_name.to_string(),
        path,
    }
}

#[tokio::test]
async fn performance_with_tracks_attaches_every_staged_file() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Show").await;
    let event_dir = store.layout().event_dir(&event.id);
    let staged = vec![
        stage(&event_dir, "Intro.mp3", b"intro"),
        stage(&event_dir, "Outro.wav", b"outro"),
    ];

    let perf = PerformanceRepo::create_with_tracks(&store, &event.id, &new_performance("Act"), &staged)
        .await
        .unwrap();

    let names: Vec<_> = perf.tracks.iter().map(|t| t.filename.as_str()).collect();
    assert_eq!(names, vec!["Intro.mp3", "Outro.wav"]);
    assert!(perf.tracks.iter().all(|t| t.performer == "Unknown"));
    assert!(staged.iter().all(|f| !f.path.exists()));
    let dir = store.layout().performance_dir(&event.id, &perf.id);
    assert_eq!(std::fs::read(dir.join("Intro.mp3")).unwrap(), b"intro");
}

#[tokio::test]
async fn performance_with_tracks_rolls_back_when_attach_fails() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Show").await;
    let event_dir = store.layout().event_dir(&event.id);
    let first = stage(&event_dir, "Intro.mp3", b"intro");
    // Never written, so moving it into place fails mid-way.
    let missing = StagedFile {
        client_name: "Middle.mp3".to_string(),
        path: event_dir.join(".track.upload.missing"),
    };
    let last = stage(&event_dir, "Outro.wav", b"outro");
    let staged = vec![first.clone(), missing, last.clone()];

    let result =
        PerformanceRepo::create_with_tracks(&store, &event.id, &new_performance("Act"), &staged).await;

    assert_matches!(result, Err(StoreError::Io { .. }));
    assert!(PerformanceRepo::list(&store, &event.id).await.unwrap().is_empty());
    assert!(!first.path.exists());
    assert!(!last.path.exists());
    let leftovers: Vec<_> = std::fs::read_dir(&event_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    assert!(leftovers.is_empty(), "performance directory left behind");
}

#[tokio::test]
async fn performance_with_tracks_for_unknown_event_discards_staged_files() {
    let (dir, store) = temp_store().await;
    let staged = vec![stage(dir.path(), "Intro.mp3", b"intro")];

    let result =
        PerformanceRepo::create_with_tracks(&store, "missing", &new_performance("Act"), &staged).await;

    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::NotFound { entity: "Event", .. }))
    );
    assert!(!staged[0].path.exists());
}

#[tokio::test]
async fn break_lifecycle() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Conference").await;

    let created = BreakRepo::create(
        &store,
        &event.id,
        &CreateBreak {
            name: "Lunch".into(),
            break_type: BreakType::Lunch,
            expected_duration: Some(3600),
        },
    )
    .await
    .unwrap();

    let updated = BreakRepo::update(
        &store,
        &event.id,
        &created.id,
        &UpdateBreak {
            break_type: Some(BreakType::SpecialShow),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.break_type, BreakType::SpecialShow);
    assert_eq!(updated.expected_duration, Some(3600));

    BreakRepo::delete(&store, &event.id, &created.id).await.unwrap();
    assert!(BreakRepo::find_by_id(&store, &event.id, &created.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn track_upload_completion_and_delete() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Show").await;
    let perf = PerformanceRepo::create(&store, &event.id, &new_performance("Act"))
        .await
        .unwrap();

    let mut claimed = TrackRepo::claim_file(&store, &event.id, &perf.id, "My Song.mp3")
        .await
        .unwrap();
    claimed.file.write_all(b"ID3").await.unwrap();
    claimed.file.flush().await.unwrap();
    assert_eq!(claimed.filename, "My_Song.mp3");

    let track = TrackRepo::create(
        &store,
        &event.id,
        &perf.id,
        &CreateTrack {
            filename: claimed.filename.clone(),
            performer: "Ana".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(
        track.url,
        format!("/api/events/{}/performances/{}/files/My_Song.mp3", event.id, perf.id)
    );
    assert!(!track.is_completed);

    let done = TrackRepo::set_completion(&store, &event.id, &perf.id, &track.id, true)
        .await
        .unwrap();
    assert!(done.is_completed);

    TrackRepo::delete(&store, &event.id, &perf.id, &track.id).await.unwrap();
    assert!(!claimed.path.exists());
    let reloaded = PerformanceRepo::find_by_id(&store, &event.id, &perf.id)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.tracks.is_empty());
}

#[tokio::test]
async fn track_rejects_unsupported_extension() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Show").await;
    let perf = PerformanceRepo::create(&store, &event.id, &new_performance("Act"))
        .await
        .unwrap();

    let result = TrackRepo::claim_file(&store, &event.id, &perf.id, "notes.txt").await;
    assert_matches!(result, Err(StoreError::Core(CoreError::Validation(_))));
}

#[tokio::test]
async fn track_missing_targets_are_distinguished() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Show").await;
    let perf = PerformanceRepo::create(&store, &event.id, &new_performance("Act"))
        .await
        .unwrap();

    assert_matches!(
        TrackRepo::set_completion(&store, &event.id, &perf.id, "nope", true).await,
        Err(StoreError::Core(CoreError::NotFound { entity: "Track", .. }))
    );
    assert_matches!(
        TrackRepo::set_completion(&store, &event.id, "nope", "nope", true).await,
        Err(StoreError::Core(CoreError::NotFound { entity: "Performance", .. }))
    );
}

#[tokio::test]
async fn failed_track_record_removes_file() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Show").await;
    let perf = PerformanceRepo::create(&store, &event.id, &new_performance("Act"))
        .await
        .unwrap();
    let claimed = TrackRepo::claim_file(&store, &event.id, &perf.id, "take.wav")
        .await
        .unwrap();
    drop(claimed.file);

    PerformanceRepo::delete(&store, &event.id, &perf.id).await.unwrap();
    let result = TrackRepo::create(
        &store,
        &event.id,
        &perf.id,
        &CreateTrack {
            filename: claimed.filename.clone(),
            performer: "Unknown".into(),
        },
    )
    .await;

    assert_matches!(result, Err(StoreError::Core(CoreError::NotFound { .. })));
    assert!(!claimed.path.exists());
}

#[tokio::test]
async fn claim_does_not_resurrect_deleted_performance_dir() {
    let (_dir, store) = temp_store().await;
    let event = create_event(&store, "Show").await;
    let perf = PerformanceRepo::create(&store, &event.id, &new_performance("Act"))
        .await
        .unwrap();
    let dir = store.layout().performance_dir(&event.id, &perf.id);
    std::fs::remove_dir_all(&dir).unwrap();

    let result = TrackRepo::claim_file(&store, &event.id, &perf.id, "take.wav").await;

    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::NotFound { entity: "Performance", .. }))
    );
    assert!(!dir.exists());
}
