//! The puzzle state store.
//!
//! [`PuzzleStore`] exclusively owns the [`GameState`]. Every mutator writes
//! through the [`SaveBackend`] before returning; there are no observers or
//! deferred flushes. Status records are created lazily the first time a key
//! is mutated or read through [`PuzzleStore::status`].
//!
//! All operations take `&mut self` for mutation, so a lock transition
//! (`set_lock`) or an attempt increment is never observable half-applied.

use std::sync::Arc;

use detective_types::{
    ContactId, GameState, Message, PuzzlePhase, PuzzleStatus, Sender, StatusKey, TurnId,
};

use crate::clock::Clock;
use crate::persistence::{MemoryBackend, SaveBackend};

pub struct PuzzleStore {
    state: GameState,
    backend: Box<dyn SaveBackend>,
    clock: Arc<dyn Clock>,
    save_failures: usize,
}

impl std::fmt::Debug for PuzzleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuzzleStore")
            .field("state", &self.state)
            .field("save_failures", &self.save_failures)
            .finish_non_exhaustive()
    }
}

impl PuzzleStore {
    /// Restore from `backend`, starting fresh if nothing is saved or the
    /// save cannot be read.
    pub fn open(mut backend: Box<dyn SaveBackend>, clock: Arc<dyn Clock>) -> Self {
        let state = match backend.load() {
            Ok(Some(state)) => {
                tracing::debug!(
                    turn = %state.current_global_turn,
                    puzzles = state.puzzle_status.len(),
                    "Loaded saved game"
                );
                state
            }
            Ok(None) => GameState::default(),
            Err(e) => {
                tracing::warn!("Failed to load save, starting fresh: {e}");
                GameState::default()
            }
        };
        Self {
            state,
            backend,
            clock,
            save_failures: 0,
        }
    }

    /// A store backed by a fresh [`MemoryBackend`].
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::open(Box::new(MemoryBackend::new()), clock)
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Saves that failed since the store was opened.
    #[must_use]
    pub fn save_failures(&self) -> usize {
        self.save_failures
    }

    fn persist(&mut self) {
        if let Err(e) = self.backend.save(&self.state) {
            self.save_failures += 1;
            tracing::warn!("Autosave failed: {e}");
        }
    }

    fn mutate<R>(&mut self, key: &StatusKey, f: impl FnOnce(&mut PuzzleStatus) -> R) -> R {
        let status = self.state.puzzle_status.entry(key.clone()).or_default();
        let result = f(status);
        self.persist();
        result
    }

    // ------------------------------------------------------------------
    // Puzzle status
    // ------------------------------------------------------------------

    /// The status for `key`, creating a zeroed record if none exists.
    pub fn status(&mut self, key: &StatusKey) -> PuzzleStatus {
        if let Some(status) = self.state.puzzle_status.get(key) {
            return *status;
        }
        self.mutate(key, |status| *status)
    }

    /// The status for `key` without creating it.
    #[must_use]
    pub fn peek_status(&self, key: &StatusKey) -> Option<&PuzzleStatus> {
        self.state.puzzle_status.get(key)
    }

    /// Record a failed attempt and return the new count.
    pub fn increment_failed(&mut self, key: &StatusKey) -> u32 {
        self.mutate(key, |status| {
            status.failed_attempts = status.failed_attempts.saturating_add(1);
            status.failed_attempts
        })
    }

    pub fn reset_failed(&mut self, key: &StatusKey) {
        self.mutate(key, |status| status.failed_attempts = 0);
    }

    /// Lock `key` until `until_ms`. A fresh lock also clears the attempt count.
    pub fn set_lock(&mut self, key: &StatusKey, until_ms: i64) {
        self.mutate(key, |status| {
            status.locked_until = Some(until_ms);
            status.failed_attempts = 0;
        });
        tracing::debug!(key = %key, until_ms, "Puzzle locked");
    }

    #[must_use]
    pub fn is_locked(&self, key: &StatusKey) -> bool {
        let now = self.now_ms();
        self.peek_status(key)
            .is_some_and(|status| status.is_locked_at(now))
    }

    #[must_use]
    pub fn locked_until(&self, key: &StatusKey) -> Option<i64> {
        self.peek_status(key).and_then(|status| status.locked_until)
    }

    #[must_use]
    pub fn is_pre_question_shown(&self, key: &StatusKey) -> bool {
        self.peek_status(key)
            .is_some_and(|status| status.pre_question_shown)
    }

    pub fn set_pre_question_shown(&mut self, key: &StatusKey, shown: bool) {
        self.mutate(key, |status| status.pre_question_shown = shown);
    }

    /// Lifecycle phase of `key` right now.
    #[must_use]
    pub fn phase(&self, key: &StatusKey, has_pre_question: bool) -> PuzzlePhase {
        PuzzlePhase::of(self.peek_status(key), has_pre_question, self.now_ms())
    }

    // ------------------------------------------------------------------
    // Global turn
    // ------------------------------------------------------------------

    #[must_use]
    pub fn current_turn(&self) -> TurnId {
        self.state.current_global_turn
    }

    /// Move the global turn forward to `next`. Never moves it back.
    ///
    /// Returns whether the turn changed.
    pub fn advance_turn(&mut self, next: TurnId) -> bool {
        if next <= self.state.current_global_turn {
            return false;
        }
        tracing::info!(
            from = %self.state.current_global_turn,
            to = %next,
            "Advancing global turn"
        );
        self.state.current_global_turn = next;
        self.persist();
        true
    }

    // ------------------------------------------------------------------
    // Chat transcripts
    // ------------------------------------------------------------------

    /// Append `message` to the contact's transcript. Messages from the
    /// player are always stored as read.
    pub fn add_message(&mut self, contact: &ContactId, mut message: Message) {
        let read = message.sender == Sender::User || message.is_read.unwrap_or(true);
        message.is_read = Some(read);
        self.state
            .chat_histories
            .entry(contact.clone())
            .or_default()
            .push(message);
        self.persist();
    }

    #[must_use]
    pub fn messages(&self, contact: &ContactId) -> &[Message] {
        self.state
            .chat_histories
            .get(contact)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Mark every unread contact message as read. Returns how many changed.
    pub fn mark_messages_read(&mut self, contact: &ContactId) -> usize {
        let Some(history) = self.state.chat_histories.get_mut(contact) else {
            return 0;
        };
        let mut changed = 0;
        for message in history
            .iter_mut()
            .filter(|m| m.sender == Sender::Contact && !m.is_read())
        {
            message.is_read = Some(true);
            changed += 1;
        }
        if changed > 0 {
            self.persist();
        }
        changed
    }

    #[must_use]
    pub fn unread_count(&self, contact: &ContactId) -> usize {
        self.messages(contact)
            .iter()
            .filter(|m| m.sender == Sender::Contact && !m.is_read())
            .count()
    }

    // ------------------------------------------------------------------
    // Reset
    // ------------------------------------------------------------------

    /// Discard all progress and delete the durable copy.
    pub fn reset_all(&mut self) {
        self.state = GameState::default();
        if let Err(e) = self.backend.clear() {
            tracing::warn!("Failed to clear save: {e}");
        }
        tracing::info!("Game state reset");
    }
}
