//! Puzzle content, progress records and resolution outcomes.
//!
//! Content types deserialize the authored contact bundles; [`GameState`] is
//! the shape of the save file; [`Outcome`] is what the resolver hands back
//! for every line the player sends. Nothing here touches the filesystem.

mod ids;
mod message;
mod outcome;
mod puzzle;
mod state;

pub use ids::{ContactId, MessageId, StatusKey, TurnId};
pub use message::{Media, MediaKind, Message, Sender};
pub use outcome::{
    CONTACT_NOT_FOUND_TEXT, INCOMPLETE_NOTIFICATION_TEXT, INVALID_FORMAT_TEXT, Outcome,
    PUZZLE_NOT_FOUND_TEXT, SolvedPuzzle,
};
pub use puzzle::{
    Contact, ContactBundle, DEFAULT_MAX_ATTEMPTS, DEFAULT_PENALTY_SECONDS, Hint,
    IncompleteNotification, NotificationPayload, NotificationSpec, PuzzleDefinition, Solution,
    SolutionResponse,
};
pub use state::{GameState, PuzzlePhase, PuzzleStatus};
