//! Durable game state.
//!
//! `GameState` is the single value that round-trips through the save file.
//! Field names follow the save format (camelCase).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ContactId, Message, StatusKey, TurnId};

/// Mutable per-puzzle progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleStatus {
    #[serde(default)]
    pub failed_attempts: u32,
    /// Absolute epoch milliseconds. `None` means unlocked.
    #[serde(default)]
    pub locked_until: Option<i64>,
    #[serde(default)]
    pub pre_question_shown: bool,
}

impl PuzzleStatus {
    /// Whether a lock is set and still in the future at `now_ms`.
    #[must_use]
    pub fn is_locked_at(&self, now_ms: i64) -> bool {
        self.locked_until.is_some_and(|until| now_ms < until)
    }
}

/// Where a puzzle key sits in its lifecycle.
///
/// Derived from the status record; lock expiry is evaluated lazily, so a
/// stale lock reads as `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzlePhase {
    /// No status record exists yet.
    Fresh,
    /// The puzzle has a pre-question that has not been shown.
    PreQuestionPending,
    Active,
    Locked { until: i64 },
}

impl PuzzlePhase {
    #[must_use]
    pub fn of(status: Option<&PuzzleStatus>, has_pre_question: bool, now_ms: i64) -> Self {
        let Some(status) = status else {
            return Self::Fresh;
        };
        if has_pre_question && !status.pre_question_shown {
            return Self::PreQuestionPending;
        }
        match status.locked_until {
            Some(until) if now_ms < until => Self::Locked { until },
            _ => Self::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(default = "first_turn")]
    pub current_global_turn: TurnId,
    #[serde(default)]
    pub chat_histories: BTreeMap<ContactId, Vec<Message>>,
    #[serde(default)]
    pub puzzle_status: BTreeMap<StatusKey, PuzzleStatus>,
}

const fn first_turn() -> TurnId {
    TurnId::FIRST
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_global_turn: TurnId::FIRST,
            chat_histories: BTreeMap::new(),
            puzzle_status: BTreeMap::new(),
        }
    }
}
