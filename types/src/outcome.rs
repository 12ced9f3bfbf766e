//! Result of resolving one player command.

use serde::Serialize;

use crate::{NotificationPayload, TurnId};

pub const INVALID_FORMAT_TEXT: &str = "Formato errato. Usa T{n}: {parola chiave}";
pub const CONTACT_NOT_FOUND_TEXT: &str = "Contatto non trovato";
pub const PUZZLE_NOT_FOUND_TEXT: &str = "Nessun enigma per questo turno";
pub const INCOMPLETE_NOTIFICATION_TEXT: &str = "Configurazione notifica incompleta";

/// Payload of a solved puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedPuzzle {
    pub text: String,
    pub next_turn: TurnId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationPayload>,
}

/// Every way a command can resolve. Lookup and format failures are
/// outcomes too: the caller always gets something to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Outcome {
    Invalid,
    ContactNotFound,
    PuzzleNotFound,
    PreQuestion { text: String },
    Locked { text: String },
    Success(SolvedPuzzle),
    Hint { text: String },
    Fail { text: String },
    ConfigError { text: String },
}

impl Outcome {
    /// Text to show in the chat for this outcome.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Invalid => INVALID_FORMAT_TEXT,
            Self::ContactNotFound => CONTACT_NOT_FOUND_TEXT,
            Self::PuzzleNotFound => PUZZLE_NOT_FOUND_TEXT,
            Self::PreQuestion { text }
            | Self::Locked { text }
            | Self::Hint { text }
            | Self::Fail { text }
            | Self::ConfigError { text } => text,
            Self::Success(solved) => &solved.text,
        }
    }

    /// Short stable label, used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::ContactNotFound => "contact_not_found",
            Self::PuzzleNotFound => "puzzle_not_found",
            Self::PreQuestion { .. } => "pre_question",
            Self::Locked { .. } => "locked",
            Self::Success(_) => "success",
            Self::Hint { .. } => "hint",
            Self::Fail { .. } => "fail",
            Self::ConfigError { .. } => "config_error",
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
