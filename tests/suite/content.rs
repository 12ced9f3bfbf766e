//! Loading authored content from disk.

use detective_engine::{ContentError, ContentRegistry, IssueKind, MemoryBackend};
use detective_types::{ContactId, Outcome, StatusKey, TurnId};

use crate::common::{content_dir, demo_content, harness};

const REGISTRY: &str = r#"[
    { "id": "c1", "file": "c1.json", "name": "Marco" },
    { "id": "c2", "file": "c2.json", "name": "Giulia", "visibleAtTurn": 2 }
]"#;

const BROKEN_NOTIFICATION: &str = r#"{
    "puzzles": [
        {
            "turnId": 1,
            "solution": {
                "keywords": ["porto"],
                "response": {
                    "text": "Giusto.",
                    "notification": { "showNotification": true, "notificationMessage": "Ciao" }
                }
            }
        }
    ]
}"#;

#[test]
fn demo_content_is_clean() {
    let registry = demo_content();
    assert_eq!(registry.contacts().len(), 2);
    assert!(registry.lint().is_empty(), "{:?}", registry.lint());
    assert!(
        registry
            .puzzle(&ContactId::new("c2"), TurnId::new(2))
            .and_then(|p| p.pre_question())
            .is_some()
    );
}

#[test]
fn incomplete_notification_is_flagged_and_solve_still_advances() {
    let dir = content_dir(&[
        ("registry.json", REGISTRY),
        ("contacts/c1.json", BROKEN_NOTIFICATION),
        ("contacts/c2.json", "{}"),
    ]);
    let registry = ContentRegistry::load_dir(dir.path()).unwrap();
    let issues = registry.lint();
    assert_eq!(issues.len(), 1);
    assert_eq!(
        issues[0].problem,
        IssueKind::IncompleteNotification("notificationContact")
    );

    let mut h = harness(registry, Box::new(MemoryBackend::new()));
    let c1 = ContactId::new("c1");
    h.session.submit(&c1, "T1: boh");

    let outcome = h.session.submit(&c1, "T1: il porto");
    assert!(matches!(outcome, Outcome::ConfigError { .. }));
    assert_eq!(outcome.text(), "Configurazione notifica incompleta");
    // Solve side effects are applied before the notification is validated.
    assert_eq!(h.session.store().current_turn(), TurnId::new(2));
    let status = h
        .session
        .store()
        .peek_status(&StatusKey::new(&c1, TurnId::FIRST))
        .copied()
        .unwrap_or_default();
    assert_eq!(status.failed_attempts, 0);
    assert!(h.toasts.visible().is_empty());
}

#[test]
fn registry_missing_is_a_read_error() {
    let dir = content_dir(&[]);
    assert!(matches!(
        ContentRegistry::load_dir(dir.path()),
        Err(ContentError::Read { .. })
    ));
}

#[test]
fn visibility_follows_turn() {
    let dir = content_dir(&[
        ("registry.json", REGISTRY),
        ("contacts/c1.json", BROKEN_NOTIFICATION),
        ("contacts/c2.json", "{}"),
    ]);
    let registry = ContentRegistry::load_dir(dir.path()).unwrap();
    let at = |turn| {
        registry
            .visible_contacts(TurnId::new(turn))
            .map(|c| c.name.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(at(1), vec!["Marco"]);
    assert_eq!(at(2), vec!["Marco", "Giulia"]);
}
