//! Configuration for bevy-portname.
//!
//! This crate provides tools for:
//! - Parsing `naming.toml` (default pattern, per-kind patterns, external kinds)
//! - Managing `naming.lock.toml` to detect pattern edits between sessions
//!
//! # Usage
//!
//! ```ignore
//! let report = portname_config::sync("naming.toml")?;
//! if report.remap {
//!     for change in &report.changes {
//!         // re-encode endpoint names of change.kind from change.old to change.new
//!     }
//! }
//! ```
//!
//! # Lock File Mechanism
//!
//! - First sync: writes `naming.lock.toml` with the effective patterns
//! - Later syncs: diff the config against the lock and report every kind
//!   whose effective pattern changed, then rewrite the lock
//! - `on_change = "keep"` reports the changes but asks callers not to remap
//!
//! To start over, delete the lock file.

mod error;
mod lock;
mod toml_parser;

pub use error::{ConfigError, LockError, SyncError};
pub use lock::{LockDiff, PatternChange, PatternLock};
pub use toml_parser::{NamingConfig, OnChange, DEFAULT_PATTERN};

use std::path::Path;

/// Outcome of a [`sync`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub config: NamingConfig,
    /// Effective pattern changes since the previous lock
    pub changes: Vec<PatternChange>,
    /// Whether existing endpoint names should be re-encoded
    pub remap: bool,
}

/// Main entry point.
///
/// Reads `naming.toml`, compares with `naming.lock.toml` next to it, and
/// updates the lock.
///
/// # Errors
///
/// Returns an error if:
/// - `naming.toml` cannot be read or parsed
/// - the lock file exists but cannot be parsed
/// - the lock file cannot be written
pub fn sync(config_path: impl AsRef<Path>) -> Result<SyncReport, SyncError> {
    let config_path = config_path.as_ref();

    // Derive lock file path from config path
    let lock_path = config_path.with_extension("lock.toml");

    sync_with_lock(config_path, &lock_path)
}

/// Sync with explicit lock file path.
pub fn sync_with_lock(
    config_path: impl AsRef<Path>,
    lock_path: impl AsRef<Path>,
) -> Result<SyncReport, SyncError> {
    let config_path = config_path.as_ref();
    let lock_path = lock_path.as_ref();

    // 1. Parse naming.toml
    let config = NamingConfig::from_file(config_path)?;

    // 2. Diff against the existing lock, if any
    let diff = if lock_path.exists() {
        PatternLock::from_file(lock_path)?.diff(&config)
    } else {
        tracing::debug!(lock = %lock_path.display(), "no pattern lock yet, creating one");
        LockDiff::default()
    };

    // 3. Rewrite the lock when it is new or stale
    if !lock_path.exists() || !diff.is_empty() {
        PatternLock::from_config(&config).write_to_file(lock_path)?;
    }

    for change in &diff.changes {
        tracing::debug!(
            kind = change.kind.as_deref().unwrap_or("<default>"),
            old = %change.old,
            new = %change.new,
            "naming pattern changed"
        );
    }

    let remap = config.on_change == OnChange::Remap;
    Ok(SyncReport {
        config,
        changes: diff.changes,
        remap,
    })
}
