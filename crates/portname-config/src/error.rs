//! Error types for configuration and lock handling.

use std::path::PathBuf;

use thiserror::Error;

/// Errors during naming.toml parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed
    #[error("I/O error reading {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
    /// TOML syntax or shape error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Semantically invalid value
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors while reading or writing naming.lock.toml.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("I/O error on {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("Lock parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Lock serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors from [`sync`](crate::sync).
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Lock file error: {0}")]
    Lock(#[from] LockError),
}
