//! Core engine for the detective game - puzzle resolution and game state.
//!
//! This crate contains the resolver and state store without UI dependencies.
//!
//! ```text
//! Session::submit(contact, "T1: ...")
//!     -> Resolver::resolve  (reads ContentRegistry, mutates PuzzleStore)
//!     -> PuzzleStore        (writes through SaveBackend on every mutation)
//!     -> Notifier           (fire-and-forget toasts on solve)
//! ```
//!
//! Randomness ([`Picker`]) and time ([`Clock`]) are injected so outcomes are
//! reproducible in tests.

pub mod clock;
pub mod content;
pub mod input;
pub mod notifications;
pub mod persistence;
pub mod random;
pub mod resolver;
pub mod session;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use content::{ContentError, ContentIssue, ContentRegistry, IssueKind};
pub use input::{Command, parse_command, tokenize};
pub use notifications::{Notifier, NullNotifier, Toast, ToastCenter, ToastRequest};
pub use persistence::{JsonFileBackend, MemoryBackend, MemorySlot, PersistError, SaveBackend};
pub use random::{Picker, RandomPicker, SequencePicker};
pub use resolver::Resolver;
pub use session::{Session, SessionSettings};
pub use store::PuzzleStore;

pub use detective_types::{
    Contact, ContactBundle, ContactId, GameState, Message, Outcome, PuzzleDefinition,
    PuzzlePhase, PuzzleStatus, Sender, SolvedPuzzle, StatusKey, TurnId,
};
