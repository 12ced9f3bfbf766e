//! Detective CLI - binary entry point.
//!
//! Wires [`detective_config`] into a [`detective_engine::Session`] and runs a
//! line-oriented chat loop on stdin/stdout.
//!
//! ```text
//! main() -> load config -> lock screen -> load content -> open save
//!        -> Repl::run(stdin) -> Session::submit -> Outcome
//! ```
//!
//! Logs go to `~/.detective/logs/detective.log` so they never interleave with
//! the chat on stdout.

mod repl;

use anyhow::{Context, Result, bail};
use std::{
    fs::{self, OpenOptions},
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use detective_config::DetectiveConfig;
use detective_engine::{
    ContentRegistry, JsonFileBackend, MemoryBackend, PuzzleStore, Resolver, SaveBackend, Session,
    SessionSettings, SystemClock, ToastCenter,
};

use crate::repl::Repl;

const LOCK_ATTEMPTS: usize = 3;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than mixing logs into the chat.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.detective/logs/detective.log
    if let Some(dir) = detective_config::config_dir() {
        candidates.push(dir.join("logs").join("detective.log"));
    }

    // Fallback: ./.detective/logs/detective.log
    candidates.push(PathBuf::from(".detective").join("logs").join("detective.log"));

    candidates
}

/// Ask for the lock code until it matches or attempts run out.
fn unlock<R: BufRead, W: Write>(
    config: &DetectiveConfig,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    if config.lock_code().is_none() {
        return Ok(());
    }
    for _ in 0..LOCK_ATTEMPTS {
        write!(out, "Codice: ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if config.unlocks(&line) {
            tracing::info!("Lock screen passed");
            return Ok(());
        }
        writeln!(out, "Codice errato.")?;
    }
    tracing::warn!("Lock screen not passed");
    bail!("wrong lock code")
}

fn build_session(
    config: &DetectiveConfig,
    clock: Arc<SystemClock>,
) -> Result<(Session, Arc<ToastCenter>)> {
    let content_dir = config.content_dir();
    let content = ContentRegistry::load_dir(&content_dir)
        .with_context(|| format!("failed to load content from {}", content_dir.display()))?;

    let backend: Box<dyn SaveBackend> = match config.save_path() {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using save file");
            Box::new(JsonFileBackend::new(path))
        }
        None => {
            tracing::warn!("No home directory; progress will not survive a restart");
            Box::new(MemoryBackend::new())
        }
    };
    let store = PuzzleStore::open(backend, clock.clone());
    let toasts = Arc::new(ToastCenter::new(clock, config.toast_ttl_ms()));

    let session = Session::new(Resolver::new(content), store, toasts.clone()).with_settings(
        SessionSettings {
            notification_delay_ms: config.notification_delay_ms(),
            toast_ttl_ms: config.toast_ttl_ms(),
        },
    );
    Ok((session, toasts))
}

fn main() -> Result<()> {
    init_tracing();

    let config = match DetectiveConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("{e}; using defaults");
            DetectiveConfig::default()
        }
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();

    writeln!(out, "{} v{}", config.title(), config.version())?;
    unlock(&config, &mut input, &mut out)?;

    let (mut session, toasts) = build_session(&config, Arc::new(SystemClock))?;
    writeln!(out, "/help per i comandi")?;

    Repl::new(&mut session, &toasts).run(input, &mut out)?;
    tracing::info!(turn = %session.store().current_turn(), "Session ended");
    Ok(())
}
