//! Sequence Repository Tests
//!
//! Tests for:
//! - Identity-shared construction (one instance per name)
//! - Rebuild after discard / discard_all
//! - Unknown names and failing construction routines
//! - JSON-authored sequences
//! - Automatic discard when the last controller is torn down

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anima::{AnimaController, AnimaError, SequenceRepository};

use common::{RecordingHost, ramp};

fn counting_repository() -> (SequenceRepository, Arc<AtomicUsize>) {
    let builds = Arc::new(AtomicUsize::new(0));
    let repository = SequenceRepository::new();
    let counter = Arc::clone(&builds);
    repository.register("spin", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(ramp("spin", 0, 9, 30.0))
    });
    (repository, builds)
}

#[test]
fn acquire_returns_same_instance() {
    let (repository, builds) = counting_repository();

    let a = repository.acquire("spin").unwrap();
    let b = repository.acquire("spin").unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(repository.is_live("spin"));
    assert_eq!(repository.live_count(), 1);
}

#[test]
fn discard_all_forces_rebuild() {
    let (repository, builds) = counting_repository();
    let first = repository.acquire("spin").unwrap();

    assert_eq!(repository.discard_all(), 1);
    assert!(!repository.is_live("spin"));

    let second = repository.acquire("spin").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(builds.load(Ordering::SeqCst), 2);
    // Holders of the old instance keep valid data
    assert_eq!(first.frame_end(), 9);
}

#[test]
fn discard_releases_repository_reference() {
    let (repository, _) = counting_repository();
    let held = repository.acquire("spin").unwrap();
    assert_eq!(Arc::strong_count(&held), 2);

    repository.discard_all();

    assert_eq!(Arc::strong_count(&held), 1);
}

#[test]
fn discard_single_name() {
    let (repository, _) = counting_repository();
    repository.acquire("spin").unwrap();

    assert!(repository.discard("spin"));
    assert!(!repository.discard("spin"));
    assert_eq!(repository.live_count(), 0);
}

#[test]
fn unknown_name_is_an_error() {
    let repository = SequenceRepository::new();
    let err = repository.acquire("missing").unwrap_err();
    assert!(matches!(err, AnimaError::UnknownSequence(ref name) if name == "missing"));
}

#[test]
fn failed_construction_is_not_cached() {
    let repository = SequenceRepository::new();
    repository.register("broken", || anima::Sequence::builder("broken").frames(5, 1).build());

    assert!(matches!(
        repository.acquire("broken"),
        Err(AnimaError::InvalidFrameRange { .. })
    ));
    assert!(!repository.is_live("broken"));
}

#[test]
fn json_sequences_decode_on_first_acquire() {
    let repository = SequenceRepository::new();
    repository.register_json(
        "door",
        r#"{
            "name": "door",
            "frame_start": 0,
            "frame_end": 1,
            "frame_rate": 12.0,
            "keyframes": [
                { "position": [0.0, 0.0, 0.0], "rotation": [0.0, 0.0, 0.0, 1.0], "scale": [1.0, 1.0, 1.0] },
                { "position": [0.0, 2.0, 0.0], "rotation": [0.0, 0.0, 0.0, 1.0], "scale": [1.0, 1.0, 1.0] }
            ]
        }"#,
    );
    assert!(!repository.is_live("door"));

    let door = repository.acquire("door").unwrap();
    assert_eq!(door.frame_rate(), 12.0);
    assert_eq!(door.get_keyframe(1).unwrap().position.y, 2.0);
}

#[test]
fn malformed_json_surfaces_error() {
    let repository = SequenceRepository::new();
    repository.register_json("bad", "{ not json");
    assert!(matches!(repository.acquire("bad"), Err(AnimaError::JsonError(_))));
}

#[test]
fn last_controller_teardown_discards_everything() {
    let (repository, builds) = counting_repository();
    let repository = Arc::new(repository);

    let first: AnimaController<RecordingHost> = AnimaController::new(Arc::clone(&repository));
    let second: AnimaController<RecordingHost> = AnimaController::new(Arc::clone(&repository));
    assert_eq!(repository.controller_count(), 2);

    let held = first.acquire("spin").unwrap();
    drop(first);
    assert!(repository.is_live("spin"), "one controller is still alive");

    drop(second);
    assert_eq!(repository.controller_count(), 0);
    assert_eq!(repository.live_count(), 0);

    let rebuilt = repository.acquire("spin").unwrap();
    assert!(!Arc::ptr_eq(&held, &rebuilt));
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}

#[test]
fn teardown_is_idempotent() {
    let repository = Arc::new(SequenceRepository::new());
    let keeper: AnimaController<RecordingHost> = AnimaController::new(Arc::clone(&repository));
    let mut controller: AnimaController<RecordingHost> = AnimaController::new(Arc::clone(&repository));

    controller.teardown();
    controller.teardown();
    drop(controller);

    assert_eq!(repository.controller_count(), 1);
    drop(keeper);
    assert_eq!(repository.controller_count(), 0);
}
