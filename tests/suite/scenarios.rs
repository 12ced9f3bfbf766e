//! End-to-end play through the demo content.

use detective_engine::{Clock, MemoryBackend};
use detective_types::{ContactId, Outcome, Sender, StatusKey, TurnId};

use crate::common::{START_MS, demo_content, harness};

fn c1() -> ContactId {
    ContactId::new("c1")
}

fn c2() -> ContactId {
    ContactId::new("c2")
}

#[test]
fn repeated_wrong_answers_lock_the_puzzle() {
    let mut h = harness(demo_content(), Box::new(MemoryBackend::new()));

    let first = h.session.submit(&c1(), "T1: wrongword");
    let second = h.session.submit(&c1(), "T1: wrongword");
    let third = h.session.submit(&c1(), "T1: wrongword");
    assert!(matches!(first, Outcome::Fail { .. }));
    assert!(matches!(second, Outcome::Fail { .. }));
    assert_eq!(
        third,
        Outcome::Locked {
            text: "Basta tentativi a caso. Richiamami più tardi.".to_owned()
        }
    );

    // Still locked just before the 30 s penalty runs out, even for the answer.
    h.clock.set(START_MS + 29_999);
    assert!(matches!(
        h.session.submit(&c1(), "T1: magazzino nove"),
        Outcome::Locked { .. }
    ));

    h.clock.set(START_MS + 30_000);
    assert!(h.session.submit(&c1(), "T1: magazzino nove").is_success());
}

#[test]
fn all_keywords_solve_and_advance_the_turn() {
    let mut h = harness(demo_content(), Box::new(MemoryBackend::new()));

    let outcome = h
        .session
        .submit(&c1(), "t1: la nave attracca al MAGAZZINO nove, credo");
    let Outcome::Success(solved) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(solved.next_turn, TurnId::new(2));
    assert_eq!(
        solved.evidence_text.as_deref(),
        Some("Bolla di consegna del magazzino 9")
    );
    assert_eq!(h.session.store().current_turn(), TurnId::new(2));

    let visible: Vec<_> = h
        .session
        .visible_contacts()
        .iter()
        .map(|c| c.id.clone())
        .collect();
    assert_eq!(visible, vec![c1(), c2()]);
}

#[test]
fn hint_does_not_consume_an_attempt() {
    let mut h = harness(demo_content(), Box::new(MemoryBackend::new()));

    for _ in 0..5 {
        assert_eq!(
            h.session.submit(&c1(), "T1: qualcosa al porto"),
            Outcome::Hint {
                text: "Sei vicino. Pensa a dove si scarica la merce.".to_owned()
            }
        );
    }
    let key = StatusKey::new(&c1(), TurnId::new(1));
    assert_eq!(
        h.session
            .store()
            .peek_status(&key)
            .map_or(0, |s| s.failed_attempts),
        0
    );
}

#[test]
fn solve_notification_reaches_other_contact() {
    let mut h = harness(demo_content(), Box::new(MemoryBackend::new()));

    assert!(h.session.submit(&c1(), "T1: magazzino nove").is_success());

    assert_eq!(h.session.store().unread_count(&c2()), 1);
    assert!(h.toasts.visible().is_empty());
    h.clock.advance(1_500);
    let toasts = h.toasts.visible();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].text, "Ho saputo del magazzino. Dobbiamo parlare.");

    let unread: Vec<_> = h.session.unread_counts();
    assert_eq!(unread, vec![(c1(), 0), (c2(), 1)]);
}

#[test]
fn pre_question_is_asked_once_before_evaluation() {
    let mut h = harness(demo_content(), Box::new(MemoryBackend::new()));
    h.session.submit(&c1(), "T1: magazzino nove");

    assert_eq!(
        h.session.submit(&c2(), "T2: registro capitaneria"),
        Outcome::PreQuestion {
            text: "Prima di tutto: ti fidi di me?".to_owned()
        }
    );
    assert_eq!(h.session.store().current_turn(), TurnId::new(2));

    let Outcome::Success(solved) = h.session.submit(&c2(), "T2: registro capitaneria") else {
        panic!("second attempt should be evaluated");
    };
    assert_eq!(solved.media_id.as_deref(), Some("registro_capitaneria.jpg"));
    assert_eq!(h.session.store().current_turn(), TurnId::new(3));
}

#[test]
fn transcript_alternates_user_and_contact() {
    let mut h = harness(demo_content(), Box::new(MemoryBackend::new()));
    h.session.submit(&c1(), "ciao");
    h.session.submit(&c1(), "T9: niente");

    let history = h.session.open_chat(&c1());
    let senders: Vec<_> = history.iter().map(|m| m.sender).collect();
    assert_eq!(
        senders,
        vec![Sender::User, Sender::Contact, Sender::User, Sender::Contact]
    );
    assert_eq!(history[1].content, Outcome::Invalid.text());
    assert_eq!(history[3].content, Outcome::PuzzleNotFound.text());
    assert!(history.iter().all(|m| m.timestamp == h.clock.now_ms()));
}

#[test]
fn unknown_contact_is_reported() {
    let mut h = harness(demo_content(), Box::new(MemoryBackend::new()));
    assert_eq!(
        h.session.submit(&ContactId::new("c99"), "T1: magazzino nove"),
        Outcome::ContactNotFound
    );
    assert_eq!(h.session.store().current_turn(), TurnId::FIRST);
}
