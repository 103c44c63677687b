//! Pattern table — kind → compiled pattern, with a default.

use std::collections::HashMap;

use portname_config::NamingConfig;

use crate::ident::EntityCategory;
use crate::pattern::{parse_pattern, PatternSpec, DEFAULT_PATTERN};
use crate::traits::PatternLookup;

/// Compiled naming patterns per node kind.
///
/// Specs are compiled once at construction. Kinds without an override use
/// the default pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternTable {
    default_text: String,
    default_spec: PatternSpec,
    by_kind: HashMap<String, (String, PatternSpec)>,
    external_kinds: Vec<String>,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN)
    }
}

impl PatternTable {
    /// Empty table with the given default pattern text.
    pub fn new(default_pattern: impl Into<String>) -> Self {
        let default_text = default_pattern.into();
        let default_spec = parse_pattern(Some(&default_text));
        Self {
            default_text,
            default_spec,
            by_kind: HashMap::new(),
            external_kinds: Vec::new(),
        }
    }

    /// Build from a parsed `naming.toml`.
    pub fn from_config(config: &NamingConfig) -> Self {
        let mut table = Self::new(config.default_pattern.clone());
        for (kind, pattern) in config.patterns() {
            table.set(kind, pattern);
        }
        table.external_kinds = config.external_kinds.clone();
        table
    }

    /// Builder: add an override and return self.
    pub fn with(mut self, kind: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.set(kind, pattern);
        self
    }

    /// Builder: mark a kind prefix as external.
    pub fn with_external(mut self, kind: impl Into<String>) -> Self {
        self.external_kinds.push(kind.into());
        self
    }

    /// Set (or replace) the override for `kind`.
    ///
    /// Returns the previous pattern text if any.
    pub fn set(&mut self, kind: impl Into<String>, pattern: impl Into<String>) -> Option<String> {
        let pattern = pattern.into();
        let spec = parse_pattern(Some(&pattern));
        self.by_kind
            .insert(kind.into(), (pattern, spec))
            .map(|(text, _)| text)
    }

    /// Remove the override for `kind`, so it falls back to the default.
    pub fn unset(&mut self, kind: &str) -> Option<String> {
        self.by_kind.remove(kind).map(|(text, _)| text)
    }

    /// Compiled spec for `kind`, borrowed.
    #[inline]
    pub fn spec(&self, kind: &str) -> &PatternSpec {
        self.by_kind
            .get(kind)
            .map_or(&self.default_spec, |(_, spec)| spec)
    }

    #[inline]
    pub fn default_spec(&self) -> &PatternSpec {
        &self.default_spec
    }

    /// Whether `kind` is one of the configured external kinds.
    pub fn is_external(&self, kind: &str) -> bool {
        self.external_kinds
            .iter()
            .any(|prefix| !prefix.is_empty() && kind.starts_with(prefix.as_str()))
    }

    pub fn external_kinds(&self) -> &[String] {
        &self.external_kinds
    }

    /// Category for a new node of `kind` named `name`.
    pub fn category_for(&self, name: &str, kind: &str, is_group: bool) -> EntityCategory {
        if !is_group && self.is_external(kind) {
            return EntityCategory::External;
        }
        EntityCategory::infer(name, is_group, &self.external_kinds)
    }

    /// Number of overrides.
    #[inline]
    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

impl PatternLookup for PatternTable {
    fn pattern_text(&self, kind: &str) -> &str {
        self.by_kind
            .get(kind)
            .map_or(self.default_text.as_str(), |(text, _)| text.as_str())
    }

    fn spec_for(&self, kind: &str) -> PatternSpec {
        self.spec(kind).clone()
    }
}
