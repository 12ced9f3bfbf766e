//! Progress survives a restart through the JSON save file.

use std::sync::Arc;

use detective_engine::{JsonFileBackend, ManualClock, MemoryBackend, SaveBackend};
use detective_types::{ContactId, GameState, Outcome, StatusKey, TurnId};

use crate::common::{START_MS, demo_content, harness, harness_at};

fn file_backend(path: &std::path::Path) -> Box<dyn SaveBackend> {
    Box::new(JsonFileBackend::new(path))
}

#[test]
fn turn_and_transcripts_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let save = dir.path().join("save.json");
    let c1 = ContactId::new("c1");

    {
        let mut h = harness(demo_content(), file_backend(&save));
        assert!(h.session.submit(&c1, "T1: magazzino nove").is_success());
    }

    let h = harness(demo_content(), file_backend(&save));
    assert_eq!(h.session.store().current_turn(), TurnId::new(2));
    assert_eq!(h.session.store().messages(&c1).len(), 2);
    assert_eq!(h.session.store().unread_count(&ContactId::new("c2")), 1);
}

#[test]
fn lock_survives_restart_and_expires_on_wall_time() {
    let dir = tempfile::tempdir().unwrap();
    let save = dir.path().join("save.json");
    let c1 = ContactId::new("c1");

    {
        let mut h = harness(demo_content(), file_backend(&save));
        for _ in 0..3 {
            h.session.submit(&c1, "T1: boh");
        }
    }

    let clock = Arc::new(ManualClock::new(START_MS + 10_000));
    let mut h = harness_at(demo_content(), file_backend(&save), clock);
    assert!(matches!(
        h.session.submit(&c1, "T1: magazzino nove"),
        Outcome::Locked { .. }
    ));
    h.clock.set(START_MS + 30_000);
    assert!(h.session.submit(&c1, "T1: magazzino nove").is_success());
}

#[test]
fn save_file_uses_camel_case_keys() {
    let dir = tempfile::tempdir().unwrap();
    let save = dir.path().join("save.json");
    {
        let mut h = harness(demo_content(), file_backend(&save));
        h.session.submit(&ContactId::new("c1"), "T1: boh");
    }

    let raw = std::fs::read_to_string(&save).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["currentGlobalTurn"], 1);
    assert_eq!(json["puzzleStatus"]["c1_1"]["failedAttempts"], 1);
    assert!(json["chatHistories"]["c1"].is_array());
}

#[test]
fn corrupt_save_starts_a_fresh_game() {
    let dir = tempfile::tempdir().unwrap();
    let save = dir.path().join("save.json");
    std::fs::write(&save, "{ not json").unwrap();

    let mut h = harness(demo_content(), file_backend(&save));
    assert_eq!(h.session.store().current_turn(), TurnId::FIRST);

    // The next mutation overwrites the broken file.
    h.session.submit(&ContactId::new("c1"), "T1: boh");
    let raw = std::fs::read_to_string(&save).unwrap();
    assert!(serde_json::from_str::<GameState>(&raw).is_ok());
}

#[test]
fn failing_backend_keeps_playing_in_memory() {
    let backend = MemoryBackend::new();
    let slot = backend.slot();
    slot.set_failing(true);

    let mut h = harness(demo_content(), Box::new(backend));
    let c1 = ContactId::new("c1");
    assert!(h.session.submit(&c1, "T1: magazzino nove").is_success());
    assert_eq!(h.session.store().current_turn(), TurnId::new(2));
    assert!(h.session.store().save_failures() > 0);
    assert!(slot.snapshot().is_none());
}

#[test]
fn reset_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let save = dir.path().join("save.json");
    {
        let mut h = harness(demo_content(), file_backend(&save));
        h.session.submit(&ContactId::new("c1"), "T1: magazzino nove");
        h.session.reset();
    }

    let h = harness(demo_content(), file_backend(&save));
    assert_eq!(h.session.store().current_turn(), TurnId::FIRST);
    assert!(
        h.session
            .store()
            .peek_status(&StatusKey::new(&ContactId::new("c1"), TurnId::FIRST))
            .is_none()
    );
}
