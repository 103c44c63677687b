//! TOML configuration parser for naming.toml.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;

/// Pattern used for kinds without an override when the config names none.
pub const DEFAULT_PATTERN: &str = "eth{n}";

/// What to do with existing endpoint names when a kind's pattern changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnChange {
    /// Re-encode existing names under the new pattern (default)
    #[default]
    Remap,
    /// Leave existing names as they are; only new links use the new pattern
    Keep,
}

/// Parsed naming configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NamingConfig {
    /// Pattern for every kind without an override
    pub default_pattern: String,
    /// Kind prefixes of special/external entities (clouds, NAT, ...)
    pub external_kinds: Vec<String>,
    /// Behavior when a pattern changes
    pub on_change: OnChange,
    /// Kind → pattern overrides
    patterns: BTreeMap<String, String>,
}

/// Raw TOML structure.
#[derive(Debug, Deserialize)]
struct RawNamingConfig {
    /// Optional default pattern (defaults to "eth{n}")
    default_pattern: Option<String>,
    /// Optional list of external kind prefixes
    external_kinds: Option<Vec<String>>,
    /// "remap" (default) or "keep"
    on_change: Option<String>,
    /// Per-kind pattern overrides
    #[serde(default)]
    patterns: BTreeMap<String, String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            default_pattern: DEFAULT_PATTERN.to_string(),
            external_kinds: Vec::new(),
            on_change: OnChange::default(),
            patterns: BTreeMap::new(),
        }
    }
}

impl NamingConfig {
    /// Parse from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_str(&content)
    }

    /// Parse from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawNamingConfig = toml::from_str(content)?;

        let default_pattern = raw
            .default_pattern
            .unwrap_or_else(|| DEFAULT_PATTERN.to_string());
        validate_pattern("default_pattern", &default_pattern)?;

        let on_change = match raw.on_change.as_deref() {
            None | Some("remap") => OnChange::Remap,
            Some("keep") => OnChange::Keep,
            Some(other) => {
                return Err(ConfigError::Validation(format!(
                    "Invalid on_change value '{}': expected 'remap' or 'keep'",
                    other
                )));
            }
        };

        let external_kinds = raw.external_kinds.unwrap_or_default();
        for kind in &external_kinds {
            validate_kind(kind)?;
        }

        for (kind, pattern) in &raw.patterns {
            validate_kind(kind)?;
            validate_pattern(kind, pattern)?;
        }

        Ok(Self {
            default_pattern,
            external_kinds,
            on_change,
            patterns: raw.patterns,
        })
    }

    /// Build a config from explicit overrides.
    pub fn with_patterns<K, P>(default_pattern: impl Into<String>, patterns: impl IntoIterator<Item = (K, P)>) -> Self
    where
        K: Into<String>,
        P: Into<String>,
    {
        Self {
            default_pattern: default_pattern.into(),
            patterns: patterns
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Effective pattern text for `kind`.
    pub fn pattern_for(&self, kind: &str) -> &str {
        self.patterns
            .get(kind)
            .map_or(self.default_pattern.as_str(), String::as_str)
    }

    /// Kind → pattern overrides, sorted by kind.
    pub fn patterns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.patterns.iter().map(|(k, p)| (k.as_str(), p.as_str()))
    }

    /// Number of overrides.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if no override is configured.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Kind names: start with letter or underscore, then alphanumerics, `_` or `-`.
fn validate_kind(kind: &str) -> Result<(), ConfigError> {
    let mut chars = kind.chars();
    match chars.next() {
        None => return Err(ConfigError::Validation("Empty kind name not allowed".into())),
        Some(first) if !first.is_alphabetic() && first != '_' => {
            return Err(ConfigError::Validation(format!(
                "Invalid kind '{}': must start with letter or underscore",
                kind
            )));
        }
        Some(_) => {}
    }
    for c in chars {
        if !c.is_alphanumeric() && c != '_' && c != '-' {
            return Err(ConfigError::Validation(format!(
                "Invalid kind '{}': contains invalid character '{}'",
                kind, c
            )));
        }
    }
    Ok(())
}

/// Patterns must carry a placeholder; anything finer is left to the parser,
/// which falls back instead of failing.
fn validate_pattern(owner: &str, pattern: &str) -> Result<(), ConfigError> {
    if !pattern.contains("{n") {
        return Err(ConfigError::Validation(format!(
            "Invalid pattern '{}' for '{}': missing {{n}} placeholder",
            pattern, owner
        )));
    }
    Ok(())
}
