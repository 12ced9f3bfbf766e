//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use detective_engine::{
    ContentRegistry, ManualClock, Notifier, PuzzleStore, Resolver, SaveBackend, SequencePicker,
    Session, SessionSettings, ToastCenter,
};

/// Fixed start time for the manual clock.
pub const START_MS: i64 = 1_700_000_000_000;

/// The demo content shipped at the workspace root.
pub fn demo_content_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../content")
}

pub fn demo_content() -> ContentRegistry {
    ContentRegistry::load_dir(&demo_content_dir()).expect("demo content loads")
}

/// Write `files` (relative path, body) under a fresh temp directory.
pub fn content_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (rel, body) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, body).expect("write fixture");
    }
    dir
}

/// Everything a test needs to drive a session deterministically.
pub struct Harness {
    pub session: Session,
    pub toasts: Arc<ToastCenter>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(content: ContentRegistry, backend: Box<dyn SaveBackend>) -> Harness {
    harness_at(content, backend, Arc::new(ManualClock::new(START_MS)))
}

pub fn harness_at(
    content: ContentRegistry,
    backend: Box<dyn SaveBackend>,
    clock: Arc<ManualClock>,
) -> Harness {
    let toasts = Arc::new(ToastCenter::new(clock.clone(), 4_000));
    let notifier: Arc<dyn Notifier> = toasts.clone();
    let session = Session::new(
        Resolver::new(content).with_picker(SequencePicker::first()),
        PuzzleStore::open(backend, clock.clone()),
        notifier,
    )
    .with_settings(SessionSettings {
        notification_delay_ms: 1_500,
        toast_ttl_ms: 4_000,
    });
    Harness {
        session,
        toasts,
        clock,
    }
}
