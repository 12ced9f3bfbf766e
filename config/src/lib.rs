//! Configuration for the detective game.
//!
//! Read from `~/.detective/config.toml`. Every section and key is optional;
//! accessors on [`DetectiveConfig`] fill in defaults. Path values support
//! `${VAR}` expansion.
//!
//! ```toml
//! [app]
//! title = "Progetto Detective"
//! lock_code = "0000"
//!
//! [game]
//! save_path = "${HOME}/.detective/save.json"
//! content_dir = "./content"
//! toast_ttl_ms = 4000
//! notification_delay_ms = 1500
//! ```

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_TITLE: &str = "Progetto Detective";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_TOAST_TTL_MS: u64 = 4_000;
pub const DEFAULT_NOTIFICATION_DELAY_MS: u64 = 1_500;
const DEFAULT_CONTENT_DIR: &str = "content";
const SAVE_FILE_NAME: &str = "save.json";

#[derive(Debug, Default, Deserialize)]
pub struct DetectiveConfig {
    pub app: Option<AppConfig>,
    pub game: Option<GameConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    pub title: Option<String>,
    pub version: Option<String>,
    /// Code the player must type to unlock the phone. Unset means no lock screen.
    pub lock_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GameConfig {
    /// Where the save file lives. Default: `~/.detective/save.json`.
    pub save_path: Option<String>,
    /// Directory holding `registry.json` and `contacts/`. Default: `./content`.
    pub content_dir: Option<String>,
    /// How long a toast stays visible.
    pub toast_ttl_ms: Option<u64>,
    /// Delay before a solve notification appears.
    pub notification_delay_ms: Option<u64>,
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if var.is_empty() {
                    out.push_str("${}");
                } else {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

impl DetectiveConfig {
    /// Load the config from its default location.
    ///
    /// `Ok(None)` when there is no home directory or no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, source);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.app
            .as_ref()
            .and_then(|app| app.title.as_deref())
            .unwrap_or(DEFAULT_TITLE)
    }

    #[must_use]
    pub fn version(&self) -> &str {
        self.app
            .as_ref()
            .and_then(|app| app.version.as_deref())
            .unwrap_or(DEFAULT_VERSION)
    }

    /// The lock code, ignoring an empty string.
    #[must_use]
    pub fn lock_code(&self) -> Option<&str> {
        self.app
            .as_ref()
            .and_then(|app| app.lock_code.as_deref())
            .filter(|code| !code.is_empty())
    }

    /// Whether `attempt` opens the lock screen. Always true without a code.
    #[must_use]
    pub fn unlocks(&self, attempt: &str) -> bool {
        self.lock_code().is_none_or(|code| code == attempt.trim())
    }

    /// Save file location; `None` only when no home directory can be found
    /// and nothing is configured.
    #[must_use]
    pub fn save_path(&self) -> Option<PathBuf> {
        match self.game.as_ref().and_then(|g| g.save_path.as_deref()) {
            Some(raw) => Some(PathBuf::from(expand_env_vars(raw))),
            None => config_dir().map(|dir| dir.join(SAVE_FILE_NAME)),
        }
    }

    #[must_use]
    pub fn content_dir(&self) -> PathBuf {
        self.game
            .as_ref()
            .and_then(|g| g.content_dir.as_deref())
            .map_or_else(
                || PathBuf::from(DEFAULT_CONTENT_DIR),
                |raw| PathBuf::from(expand_env_vars(raw)),
            )
    }

    #[must_use]
    pub fn toast_ttl_ms(&self) -> u64 {
        self.game
            .as_ref()
            .and_then(|g| g.toast_ttl_ms)
            .unwrap_or(DEFAULT_TOAST_TTL_MS)
    }

    #[must_use]
    pub fn notification_delay_ms(&self) -> u64 {
        self.game
            .as_ref()
            .and_then(|g| g.notification_delay_ms)
            .unwrap_or(DEFAULT_NOTIFICATION_DELAY_MS)
    }
}

/// `~/.detective`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".detective"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
