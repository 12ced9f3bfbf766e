//! Puzzle resolution.
//!
//! [`Resolver::resolve`] turns one line of player input into an [`Outcome`].
//! Checks run in a fixed order and the first that applies wins:
//!
//! 1. command format (`T<n>: text`)
//! 2. contact and puzzle lookup
//! 3. pre-question gate (shown once, input not evaluated)
//! 4. lock gate (no attempt consumed)
//! 5. solution: every keyword present
//! 6. hint: first hint with any keyword present
//! 7. failure, escalating to a lock at the attempt limit
//!
//! The resolver holds content and a [`Picker`]; all mutable progress lives in
//! the [`PuzzleStore`].

use detective_types::{
    ContactId, INCOMPLETE_NOTIFICATION_TEXT, Outcome, PuzzleDefinition, SolvedPuzzle, StatusKey,
};

use crate::content::ContentRegistry;
use crate::input::{self, Command};
use crate::random::{Picker, RandomPicker, pick_text};
use crate::store::PuzzleStore;

const DEFAULT_COOLDOWN_TEXT: &str = "Sistema Bloccato. Raffreddamento in corso...";
const DEFAULT_LOCKOUT_TEXT: &str = "Sistema Bloccato.";
const DEFAULT_FALLBACK_TEXT: &str = "Wrong.";

pub struct Resolver {
    content: ContentRegistry,
    picker: Box<dyn Picker>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    #[must_use]
    pub fn new(content: ContentRegistry) -> Self {
        Self {
            content,
            picker: Box::new(RandomPicker),
        }
    }

    /// Replace the randomness source, e.g. with a fixed sequence in tests.
    #[must_use]
    pub fn with_picker(mut self, picker: impl Picker + 'static) -> Self {
        self.picker = Box::new(picker);
        self
    }

    #[must_use]
    pub fn content(&self) -> &ContentRegistry {
        &self.content
    }

    /// Resolve `input` addressed to `contact`. Never fails: lookup and
    /// format problems come back as outcomes.
    pub fn resolve(&mut self, store: &mut PuzzleStore, contact: &ContactId, input: &str) -> Outcome {
        let outcome = self.evaluate(store, contact, input);
        tracing::debug!(contact = %contact, outcome = outcome.label(), "Resolved input");
        outcome
    }

    fn evaluate(&mut self, store: &mut PuzzleStore, contact: &ContactId, input: &str) -> Outcome {
        let Some(Command { turn_id, message }) = input::parse_command(input) else {
            return Outcome::Invalid;
        };
        let Some(bundle) = self.content.bundle(contact) else {
            return Outcome::ContactNotFound;
        };
        let Some(puzzle) = bundle.puzzle(turn_id) else {
            return Outcome::PuzzleNotFound;
        };
        let key = StatusKey::new(contact, turn_id);
        let picker = &mut *self.picker;

        if let Some(pre_question) = puzzle.pre_question()
            && !store.is_pre_question_shown(&key)
        {
            store.set_pre_question_shown(&key, true);
            return Outcome::PreQuestion {
                text: pre_question.to_owned(),
            };
        }

        if store.is_locked(&key) {
            return Outcome::Locked {
                text: pick_text(picker, &puzzle.penalty_responses, DEFAULT_COOLDOWN_TEXT),
            };
        }

        let tokens = input::tokenize(&message);

        if input::contains_all(&tokens, &puzzle.solution.keywords) {
            return solve(store, &key, puzzle);
        }

        if let Some(hint) = puzzle
            .hints
            .iter()
            .find(|hint| input::contains_any(&tokens, &hint.keywords))
        {
            return Outcome::Hint {
                text: hint.response.clone(),
            };
        }

        let attempts = store.increment_failed(&key);
        let fallback = pick_text(picker, &puzzle.fallbacks, DEFAULT_FALLBACK_TEXT);
        if attempts >= puzzle.attempt_limit() {
            let until = store.now_ms().saturating_add(puzzle.penalty_millis());
            store.set_lock(&key, until);
            tracing::info!(key = %key, attempts, until_ms = until, "Attempt limit reached");
            return Outcome::Locked {
                text: pick_text(picker, &puzzle.penalty_responses, DEFAULT_LOCKOUT_TEXT),
            };
        }
        Outcome::Fail { text: fallback }
    }
}

/// Apply the solve side effects, then validate the notification payload.
///
/// The turn advance and attempt reset happen even when the notification
/// block turns out to be incomplete.
fn solve(store: &mut PuzzleStore, key: &StatusKey, puzzle: &PuzzleDefinition) -> Outcome {
    let response = &puzzle.solution.response;
    let next_turn = response.next_turn_after(puzzle.turn_id);
    store.advance_turn(next_turn);
    store.reset_failed(key);

    let notification = match puzzle.notification().map(|n| n.payload()).transpose() {
        Ok(payload) => payload.flatten(),
        Err(e) => {
            tracing::error!(key = %key, "Puzzle content error: {e}");
            return Outcome::ConfigError {
                text: INCOMPLETE_NOTIFICATION_TEXT.to_owned(),
            };
        }
    };

    Outcome::Success(SolvedPuzzle {
        text: response.text.clone(),
        next_turn,
        media_id: response.media_id.clone(),
        evidence_text: response.evidence_text.clone(),
        message_id: response.message_id.clone(),
        notification,
    })
}
