//! Bevy integration for endpoint naming.
//!
//! Provides:
//! - `NamingPlugin` — builder-pattern plugin installing the [`PatternTable`] as a Resource
//! - `EndpointNames` — per-entity endpoint names with collision-free allocation
//!
//! # Example
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_portname::bevy::*;
//!
//! fn main() {
//!     let config = portname_config::NamingConfig::from_file("naming.toml").unwrap();
//!     App::new()
//!         .add_plugins(NamingPlugin::from_config(&config))
//!         .add_systems(Update, wire_new_links)
//!         .run();
//! }
//!
//! fn wire_new_links(table: Res<PatternTable>, mut query: Query<(&NodeKind, &mut EndpointNames)>) {
//!     for (kind, mut names) in query.iter_mut() {
//!         let name = names.next_name(table.spec(&kind.0));
//!         names.insert(name);
//!     }
//! }
//! ```

use bevy::prelude::*;
use std::collections::{BTreeSet, HashSet};

use portname_config::NamingConfig;

use crate::codec::{name_for_offset, offset_for_name};
use crate::pattern::PatternSpec;
use crate::pool::next_free_offset;
use crate::table::PatternTable;

// =============================================================================
// Plugin
// =============================================================================

/// Bevy plugin for endpoint naming.
///
/// ```ignore
/// App::new()
///     .add_plugins(
///         NamingPlugin::new()
///             .with_table(PatternTable::default().with("router", "ge-0/0/{n:0}"))
///     )
/// ```
#[derive(Default)]
pub struct NamingPlugin {
    table: Option<PatternTable>,
}

impl NamingPlugin {
    /// Create a plugin using the default pattern for every kind.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a plugin from a parsed `naming.toml`.
    pub fn from_config(config: &NamingConfig) -> Self {
        Self {
            table: Some(PatternTable::from_config(config)),
        }
    }

    /// Use an explicit pattern table.
    pub fn with_table(mut self, table: PatternTable) -> Self {
        self.table = Some(table);
        self
    }
}

impl Plugin for NamingPlugin {
    fn build(&self, app: &mut App) {
        let table = self.table.clone().unwrap_or_default();
        app.insert_resource(table);
    }
}

/// Node kind of an entity; selects its naming pattern.
#[derive(Component, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKind(pub String);

// =============================================================================
// EndpointNames Component
// =============================================================================

/// Endpoint names attached to one entity.
///
/// Allocation only reads the set; call [`insert`](Self::insert) with the
/// returned name before allocating again.
#[derive(Component, Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointNames {
    names: BTreeSet<String>,
}

impl EndpointNames {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add a name and return self.
    #[inline]
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Returns `true` if the name was newly inserted.
    #[inline]
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Returns `true` if the name was present.
    #[inline]
    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Offsets taken under `spec`; names it did not produce are skipped.
    pub fn used_offsets(&self, spec: &PatternSpec) -> HashSet<usize> {
        self.names
            .iter()
            .filter_map(|name| offset_for_name(spec, name))
            .collect()
    }

    /// Lowest free name under `spec`.
    pub fn next_name(&self, spec: &PatternSpec) -> String {
        name_for_offset(spec, next_free_offset(&self.used_offsets(spec)))
    }

    /// Iterate names in sorted order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.names.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for EndpointNames {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(Into::<String>::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for EndpointNames {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.names.extend(iter.into_iter().map(Into::<String>::into));
    }
}

// =============================================================================
// Resource impl for PatternTable
// =============================================================================

impl Resource for PatternTable {}

// =============================================================================
// Tests
// =============================================================================
