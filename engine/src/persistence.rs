//! Durable backing for [`GameState`].
//!
//! The store calls [`SaveBackend::save`] after every mutation; backends only
//! move bytes. The save format is the camelCase JSON of `GameState`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use detective_types::GameState;
use detective_utils::SyncPolicy;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("save file I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("save file at {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize game state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("save storage is unavailable")]
    Unavailable,
}

pub trait SaveBackend {
    /// The persisted state, `None` when nothing has been saved yet.
    fn load(&mut self) -> Result<Option<GameState>, PersistError>;
    fn save(&mut self, state: &GameState) -> Result<(), PersistError>;
    /// Remove the durable copy.
    fn clear(&mut self) -> Result<(), PersistError>;
}

/// Pretty-printed JSON file written atomically.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
    sync: SyncPolicy,
}

impl JsonFileBackend {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync: SyncPolicy::Durable,
        }
    }

    #[must_use]
    pub fn with_sync(mut self, sync: SyncPolicy) -> Self {
        self.sync = sync;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SaveBackend for JsonFileBackend {
    fn load(&mut self) -> Result<Option<GameState>, PersistError> {
        detective_utils::recover_bak_file(&self.path);
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| PersistError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&mut self, state: &GameState) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(state)?;
        detective_utils::atomic_write_with_policy(&self.path, json.as_bytes(), self.sync)
            .map_err(|e| self.io_error(e))
    }

    fn clear(&mut self) -> Result<(), PersistError> {
        detective_utils::remove_with_backup(&self.path).map_err(|e| self.io_error(e))
    }
}

#[derive(Debug, Default)]
struct MemorySlotInner {
    saved: Option<String>,
    saves: usize,
    failing: bool,
}

/// Shared view of a [`MemoryBackend`]'s storage, for inspecting flushes.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    inner: Arc<Mutex<MemorySlotInner>>,
}

impl MemorySlot {
    fn with<R>(&self, f: impl FnOnce(&mut MemorySlotInner) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// The last saved state, decoded.
    #[must_use]
    pub fn snapshot(&self) -> Option<GameState> {
        self.with(|inner| {
            inner
                .saved
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok())
        })
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.with(|inner| inner.saves)
    }

    /// Make subsequent loads and saves fail with [`PersistError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.with(|inner| inner.failing = failing);
    }
}

/// In-process backend. State still round-trips through JSON so tests
/// exercise the save format.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: MemorySlot,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that starts with `state` already saved.
    pub fn with_state(state: &GameState) -> Result<Self, PersistError> {
        let backend = Self::new();
        let raw = serde_json::to_string(state)?;
        backend.slot.with(|inner| inner.saved = Some(raw));
        Ok(backend)
    }

    #[must_use]
    pub fn slot(&self) -> MemorySlot {
        self.slot.clone()
    }
}

impl SaveBackend for MemoryBackend {
    fn load(&mut self) -> Result<Option<GameState>, PersistError> {
        self.slot.with(|inner| {
            if inner.failing {
                return Err(PersistError::Unavailable);
            }
            inner
                .saved
                .as_deref()
                .map(serde_json::from_str::<GameState>)
                .transpose()
                .map_err(PersistError::Serialize)
        })
    }

    fn save(&mut self, state: &GameState) -> Result<(), PersistError> {
        let raw = serde_json::to_string(state)?;
        self.slot.with(|inner| {
            if inner.failing {
                return Err(PersistError::Unavailable);
            }
            inner.saved = Some(raw);
            inner.saves += 1;
            Ok(())
        })
    }

    fn clear(&mut self) -> Result<(), PersistError> {
        self.slot.with(|inner| {
            if inner.failing {
                return Err(PersistError::Unavailable);
            }
            inner.saved = None;
            Ok(())
        })
    }
}
