//! Shared infrastructure utilities for the detective engine.
//!
//! - **`atomic_write`**: Crash-safe save file persistence (temp + rename)

pub mod atomic_write;

pub use atomic_write::{
    SyncPolicy, atomic_write, atomic_write_with_policy, backup_path, recover_bak_file,
    remove_with_backup,
};
