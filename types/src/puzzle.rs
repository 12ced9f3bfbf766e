//! Authored puzzle content.
//!
//! These types mirror the JSON content bundles shipped with the game
//! (camelCase keys). Every collection is optional in the source files and
//! deserializes to an empty default, so a sparse puzzle never fails to load.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ContactId, TurnId};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_PENALTY_SECONDS: u32 = 10;

const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

const fn default_penalty_seconds() -> u32 {
    DEFAULT_PENALTY_SECONDS
}

/// All puzzles belonging to one contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactBundle {
    #[serde(default)]
    pub puzzles: Vec<PuzzleDefinition>,
}

impl ContactBundle {
    /// First puzzle declared for `turn`.
    #[must_use]
    pub fn puzzle(&self, turn: TurnId) -> Option<&PuzzleDefinition> {
        self.puzzles.iter().find(|p| p.turn_id == turn)
    }
}

/// One challenge tied to a `(contact, turn)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleDefinition {
    pub turn_id: TurnId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_question: Option<String>,
    #[serde(default)]
    pub solution: Solution,
    #[serde(default)]
    pub hints: Vec<Hint>,
    #[serde(default)]
    pub fallbacks: Vec<String>,
    #[serde(default)]
    pub penalty_responses: Vec<String>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_penalty_seconds")]
    pub penalty_seconds: u32,
    /// Older content files attach the notification to the puzzle rather
    /// than to the solution response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationSpec>,
}

impl PuzzleDefinition {
    /// A bare puzzle with the given solution keywords and default tuning.
    #[must_use]
    pub fn new(turn_id: TurnId, keywords: &[&str], response: impl Into<String>) -> Self {
        Self {
            turn_id,
            pre_question: None,
            solution: Solution {
                keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
                response: SolutionResponse::new(response),
            },
            hints: Vec::new(),
            fallbacks: Vec::new(),
            penalty_responses: Vec::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            penalty_seconds: DEFAULT_PENALTY_SECONDS,
            notification: None,
        }
    }

    /// The pre-question, ignoring blank text.
    #[must_use]
    pub fn pre_question(&self) -> Option<&str> {
        self.pre_question
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    /// Failed attempts that trigger a lock. Zero falls back to the default.
    #[must_use]
    pub fn attempt_limit(&self) -> u32 {
        if self.max_attempts == 0 {
            DEFAULT_MAX_ATTEMPTS
        } else {
            self.max_attempts
        }
    }

    /// Lock duration in milliseconds. Zero falls back to the default.
    #[must_use]
    pub fn penalty_millis(&self) -> i64 {
        let seconds = if self.penalty_seconds == 0 {
            DEFAULT_PENALTY_SECONDS
        } else {
            self.penalty_seconds
        };
        i64::from(seconds) * 1_000
    }

    /// Notification block for a successful solve. The response-level block
    /// takes precedence over the puzzle-level one.
    #[must_use]
    pub fn notification(&self) -> Option<&NotificationSpec> {
        self.solution
            .response
            .notification
            .as_ref()
            .or(self.notification.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    /// All of these must appear in the player's message.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub response: SolutionResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_turn: Option<TurnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationSpec>,
}

impl SolutionResponse {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Turn to advance to after solving the puzzle at `turn`.
    ///
    /// An explicit `nextTurn` of zero is treated as absent.
    #[must_use]
    pub fn next_turn_after(&self, turn: TurnId) -> TurnId {
        self.next_turn
            .filter(|next| next.value() > 0)
            .unwrap_or_else(|| turn.next())
    }
}

/// A partial-match response: any one keyword triggers it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub response: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSpec {
    #[serde(default)]
    pub show_notification: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_contact: Option<ContactId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_message: Option<String>,
}

/// A notification block that asks to be shown but lacks its payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("notification is enabled but {missing} is missing")]
pub struct IncompleteNotification {
    pub missing: &'static str,
}

impl NotificationSpec {
    /// The payload to deliver, `None` when the notification is disabled.
    pub fn payload(&self) -> Result<Option<NotificationPayload>, IncompleteNotification> {
        if !self.show_notification {
            return Ok(None);
        }
        let contact = self
            .notification_contact
            .as_ref()
            .filter(|c| !c.as_str().trim().is_empty())
            .ok_or(IncompleteNotification {
                missing: "notificationContact",
            })?;
        let message = self
            .notification_message
            .as_ref()
            .filter(|m| !m.trim().is_empty())
            .ok_or(IncompleteNotification {
                missing: "notificationMessage",
            })?;
        Ok(Some(NotificationPayload {
            contact: contact.clone(),
            message: message.clone(),
        }))
    }
}

/// A validated notification ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub contact: ContactId,
    pub message: String,
}

/// Registry metadata about a contact, used by chat lists and profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    /// Bundle file name relative to the contacts directory.
    pub file: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "first_turn")]
    pub visible_at_turn: TurnId,
}

const fn first_turn() -> TurnId {
    TurnId::FIRST
}
