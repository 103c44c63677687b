//! Host-facing interfaces.
//!
//! The engine never owns the diagram. Hosts hand it three read callbacks
//! (pattern lookup, connection enumeration, alias resolution) and, for
//! remapping only, one write callback.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::pattern::{parse_pattern, PatternSpec};

/// Whole-entity identifier (node name in the diagram).
pub type EntityId = String;

/// Host-assigned link identifier.
pub type LinkId = u64;

/// Which end of a link an entity occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Source,
    Target,
}

impl Role {
    pub const BOTH: [Role; 2] = [Role::Source, Role::Target];
}

/// One endpoint held by an entity: the link, the role the entity plays in
/// it, and the endpoint name recorded for that role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRef {
    pub link: LinkId,
    pub role: Role,
    pub name: String,
}

impl EndpointRef {
    pub fn new(link: LinkId, role: Role, name: impl Into<String>) -> Self {
        Self {
            link,
            role,
            name: name.into(),
        }
    }
}

/// Kind → naming-pattern text.
pub trait PatternLookup {
    /// Pattern text for `kind`, falling back to the process-wide default.
    fn pattern_text(&self, kind: &str) -> &str;

    /// Compiled pattern for `kind`.
    fn spec_for(&self, kind: &str) -> PatternSpec {
        parse_pattern(Some(self.pattern_text(kind)))
    }
}

/// Entity → endpoints currently attached to it.
pub trait ConnectionEnumerator {
    /// Every endpoint `entity` holds. A self-loop yields both roles.
    fn connections_of(&self, entity: &str) -> Vec<EndpointRef>;
}

/// Entity → ids of every alias of the same logical entity.
pub trait AliasResolver {
    /// Alias set of `entity`, including `entity` itself.
    fn aliases_of(&self, entity: &str) -> BTreeSet<EntityId>;
}

/// Write side used by the remap coordinator.
pub trait EndpointWriter {
    fn set_endpoint_name(&mut self, link: LinkId, role: Role, name: String);
}

impl<T: PatternLookup + ?Sized> PatternLookup for &T {
    fn pattern_text(&self, kind: &str) -> &str {
        (**self).pattern_text(kind)
    }

    fn spec_for(&self, kind: &str) -> PatternSpec {
        (**self).spec_for(kind)
    }
}

impl<T: ConnectionEnumerator + ?Sized> ConnectionEnumerator for &T {
    fn connections_of(&self, entity: &str) -> Vec<EndpointRef> {
        (**self).connections_of(entity)
    }
}

impl<T: AliasResolver + ?Sized> AliasResolver for &T {
    fn aliases_of(&self, entity: &str) -> BTreeSet<EntityId> {
        (**self).aliases_of(entity)
    }
}
