//! Allocation pool — lowest free offset within a scope.
//!
//! Allocation is stateless: the pool rescans the scope on every call and
//! records nothing. The caller must attach the returned name before asking
//! again, otherwise the same name comes back.

use std::collections::{BTreeSet, HashSet};

use crate::codec::{name_for_offset, offset_for_name};
use crate::pattern::PatternSpec;
use crate::traits::{AliasResolver, ConnectionEnumerator, EntityId, PatternLookup};

/// Entities whose endpoint names share one numbering pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocationScope {
    /// A single entity.
    Entity(EntityId),
    /// Several UI aliases of one logical entity.
    AliasGroup(BTreeSet<EntityId>),
}

impl AllocationScope {
    /// Resolve the scope of `entity` through the host's alias resolver.
    ///
    /// Membership is recomputed on every call and never cached.
    pub fn resolve(entity: &str, resolver: &impl AliasResolver) -> Self {
        let mut members = resolver.aliases_of(entity);
        members.insert(entity.to_string());
        if members.len() == 1 {
            Self::Entity(entity.to_string())
        } else {
            Self::AliasGroup(members)
        }
    }

    /// Member ids in deterministic order.
    pub fn members(&self) -> Vec<&str> {
        match self {
            Self::Entity(id) => vec![id.as_str()],
            Self::AliasGroup(ids) => ids.iter().map(String::as_str).collect(),
        }
    }

    pub fn contains(&self, entity: &str) -> bool {
        match self {
            Self::Entity(id) => id == entity,
            Self::AliasGroup(ids) => ids.contains(entity),
        }
    }
}

/// Smallest non-negative integer not in `used`.
pub fn next_free_offset(used: &HashSet<usize>) -> usize {
    // Among used.len() + 1 candidates at least one is free.
    (0..=used.len())
        .find(|offset| !used.contains(offset))
        .unwrap_or(used.len())
}

/// Offsets already consumed by endpoint names inside `scope`.
///
/// Names that do not decode under `spec` are ignored.
pub fn collect_used_offsets(
    spec: &PatternSpec,
    scope: &AllocationScope,
    connections: &impl ConnectionEnumerator,
) -> HashSet<usize> {
    scope
        .members()
        .into_iter()
        .flat_map(|member| connections.connections_of(member))
        .filter_map(|endpoint| offset_for_name(spec, &endpoint.name))
        .collect()
}

/// Next free endpoint name in `scope`. Has no side effects.
pub fn allocate(
    spec: &PatternSpec,
    scope: &AllocationScope,
    connections: &impl ConnectionEnumerator,
) -> String {
    let used = collect_used_offsets(spec, scope, connections);
    let offset = next_free_offset(&used);
    let name = name_for_offset(spec, offset);
    tracing::trace!(pattern = %spec, offset, name = %name, "allocated endpoint name");
    name
}

/// Allocate an endpoint name for `entity` of `kind`, resolving the pattern
/// and the alias-group scope through the host.
pub fn allocate_endpoint<H>(host: &H, entity: &str, kind: &str) -> String
where
    H: PatternLookup + ConnectionEnumerator + AliasResolver,
{
    let spec = host.spec_for(kind);
    let scope = AllocationScope::resolve(entity, host);
    allocate(&spec, &scope, host)
}
