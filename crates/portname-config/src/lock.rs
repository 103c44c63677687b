//! Pattern lock file (naming.lock.toml).
//!
//! Records the patterns the current endpoint names were allocated under, so
//! a later config edit can be diffed and the affected names remapped.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::LockError;
use crate::toml_parser::NamingConfig;

/// Last applied naming patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternLock {
    /// RFC 3339 timestamp of the last write
    pub generated_at: String,
    pub default_pattern: String,
    /// Kind → pattern overrides
    #[serde(default)]
    pub patterns: BTreeMap<String, String>,
}

/// Effective pattern change for one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternChange {
    /// `None` for the default pattern (every kind without an override)
    pub kind: Option<String>,
    pub old: String,
    pub new: String,
}

/// Differences between a lock and a config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockDiff {
    /// Default change first, then kinds in sorted order
    pub changes: Vec<PatternChange>,
}

impl LockDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl PatternLock {
    /// Snapshot the effective patterns of `config`.
    pub fn from_config(config: &NamingConfig) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            default_pattern: config.default_pattern.clone(),
            patterns: config
                .patterns()
                .map(|(k, p)| (k.to_string(), p.to_string()))
                .collect(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LockError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| LockError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, LockError> {
        Ok(toml::from_str(content)?)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), LockError> {
        let path = path.as_ref();
        let mut content = String::from("# Generated by portname-config. Do not edit by hand.\n\n");
        content.push_str(&toml::to_string_pretty(self)?);
        std::fs::write(path, content).map_err(|error| LockError::Io {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Pattern recorded for `kind`.
    pub fn pattern_for(&self, kind: &str) -> &str {
        self.patterns
            .get(kind)
            .map_or(self.default_pattern.as_str(), String::as_str)
    }

    /// Kinds whose effective pattern differs between this lock and `config`.
    pub fn diff(&self, config: &NamingConfig) -> LockDiff {
        let mut changes = Vec::new();

        if self.default_pattern != config.default_pattern {
            changes.push(PatternChange {
                kind: None,
                old: self.default_pattern.clone(),
                new: config.default_pattern.clone(),
            });
        }

        let kinds: BTreeSet<&str> = self
            .patterns
            .keys()
            .map(String::as_str)
            .chain(config.patterns().map(|(k, _)| k))
            .collect();

        for kind in kinds {
            let old = self.pattern_for(kind);
            let new = config.pattern_for(kind);
            if old != new {
                changes.push(PatternChange {
                    kind: Some(kind.to_string()),
                    old: old.to_string(),
                    new: new.to_string(),
                });
            }
        }

        LockDiff { changes }
    }
}
