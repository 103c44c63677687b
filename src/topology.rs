//! In-memory topology — a ready-made host for the naming engine.
//!
//! Provides:
//! - Nodes with a kind (selects the naming pattern) and an id category
//! - Alias groups: UI copies of one logical node sharing one endpoint pool
//! - Links whose endpoint names are allocated without collisions
//! - Duplication, renaming and kind changes that keep names consistent
//!
//! Editors that own their graph implement the [`traits`](crate::traits)
//! directly instead.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::codec::{name_for_offset, offset_for_name};
use crate::error::{Result, TopologyError};
use crate::ident::{unique_id, EntityCategory};
use crate::pool::{allocate_endpoint, collect_used_offsets, next_free_offset, AllocationScope};
use crate::remap::remap_on_pattern_change;
use crate::table::PatternTable;
use crate::traits::{
    AliasResolver, ConnectionEnumerator, EndpointRef, EndpointWriter, EntityId, LinkId, PatternLookup, Role,
};

/// A diagram node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: EntityId,
    pub kind: String,
    pub category: EntityCategory,
    /// Root of the alias group this node belongs to, if it is an alias.
    pub alias_of: Option<EntityId>,
}

/// One end of a link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub node: EntityId,
    pub name: String,
}

impl Endpoint {
    pub fn new(node: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub source: Endpoint,
    pub target: Endpoint,
}

impl Link {
    #[inline]
    pub fn endpoint(&self, role: Role) -> &Endpoint {
        match role {
            Role::Source => &self.source,
            Role::Target => &self.target,
        }
    }

    #[inline]
    fn endpoint_mut(&mut self, role: Role) -> &mut Endpoint {
        match role {
            Role::Source => &mut self.source,
            Role::Target => &mut self.target,
        }
    }
}

/// Nodes and links of one diagram, plus the naming patterns they follow.
#[derive(Clone, Debug, Default)]
pub struct Topology {
    patterns: PatternTable,
    nodes: BTreeMap<EntityId, Node>,
    links: BTreeMap<LinkId, Link>,
    next_link: LinkId,
}

impl Topology {
    pub fn new(patterns: PatternTable) -> Self {
        Self {
            patterns,
            ..Self::default()
        }
    }

    #[inline]
    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes, sorted by id.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    /// All links, in creation order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    fn require(&self, id: &str) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| TopologyError::UnknownNode(id.to_string()))
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Add a node. The id must be unused.
    pub fn add_node(&mut self, id: impl Into<EntityId>, kind: impl Into<String>, category: EntityCategory) -> Result<()> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(TopologyError::NameTaken(id));
        }
        self.nodes.insert(
            id.clone(),
            Node {
                id,
                kind: kind.into(),
                category,
                alias_of: None,
            },
        );
        Ok(())
    }

    /// Add `id` as another representation of `of`'s logical node.
    ///
    /// The alias joins the group rooted at `of`'s root and takes its kind.
    pub fn add_alias(&mut self, id: impl Into<EntityId>, of: &str) -> Result<()> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(TopologyError::NameTaken(id));
        }
        let target = self.require(of)?;
        let root = target.alias_of.clone().unwrap_or_else(|| target.id.clone());
        let node = Node {
            id: id.clone(),
            kind: target.kind.clone(),
            category: target.category,
            alias_of: Some(root),
        };
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Remove a node, its links, and the aliases rooted at it.
    pub fn remove_node(&mut self, id: &str) -> Result<Node> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| TopologyError::UnknownNode(id.to_string()))?;

        let mut removed: HashSet<EntityId> = HashSet::from([node.id.clone()]);
        self.nodes.retain(|_, other| {
            let keep = other.alias_of.as_deref() != Some(id);
            if !keep {
                removed.insert(other.id.clone());
            }
            keep
        });
        self.links
            .retain(|_, link| !removed.contains(&link.source.node) && !removed.contains(&link.target.node));

        tracing::debug!(node = id, removed = removed.len(), "removed node");
        Ok(node)
    }

    /// Rename a node. Fails if `new_id` is taken by another node.
    pub fn rename_node(&mut self, id: &str, new_id: impl Into<EntityId>) -> Result<()> {
        let new_id = new_id.into();
        if new_id == id {
            return self.require(id).map(|_| ());
        }
        if self.nodes.contains_key(&new_id) {
            return Err(TopologyError::NameTaken(new_id));
        }
        let mut node = self
            .nodes
            .remove(id)
            .ok_or_else(|| TopologyError::UnknownNode(id.to_string()))?;
        node.id = new_id.clone();
        self.nodes.insert(new_id.clone(), node);

        for other in self.nodes.values_mut() {
            if other.alias_of.as_deref() == Some(id) {
                other.alias_of = Some(new_id.clone());
            }
        }
        for link in self.links.values_mut() {
            for role in Role::BOTH {
                let endpoint = link.endpoint_mut(role);
                if endpoint.node == id {
                    endpoint.node = new_id.clone();
                }
            }
        }
        Ok(())
    }

    /// Fresh node id derived from `base` that no node uses.
    pub fn suggest_id(&self, base: &str, category: EntityCategory) -> EntityId {
        let used: HashSet<String> = self.nodes.keys().cloned().collect();
        unique_id(base, &used, category)
    }

    /// Copy `ids` under fresh ids, along with the links between them.
    ///
    /// Endpoint names are copied as is: the copies are new nodes, so their
    /// pools start from the copied links only. Returns the new ids in input
    /// order.
    pub fn duplicate(&mut self, ids: &[&str]) -> Result<Vec<EntityId>> {
        for id in ids {
            self.require(id)?;
        }

        let mut used: HashSet<String> = self.nodes.keys().cloned().collect();
        let mut mapping: HashMap<EntityId, EntityId> = HashMap::new();
        let mut created = Vec::with_capacity(ids.len());

        for &id in ids {
            if mapping.contains_key(id) {
                continue;
            }
            let category = self.require(id)?.category;
            let copy = unique_id(id, &used, category);
            used.insert(copy.clone());
            mapping.insert(id.to_string(), copy.clone());
            created.push(copy);
        }

        for (original, copy) in &mapping {
            let source = self.require(original)?;
            // Alias links survive only when the root is copied too.
            let alias_of = source
                .alias_of
                .as_ref()
                .and_then(|root| mapping.get(root))
                .cloned();
            let node = Node {
                id: copy.clone(),
                kind: source.kind.clone(),
                category: source.category,
                alias_of,
            };
            self.nodes.insert(copy.clone(), node);
        }

        let internal: Vec<(Endpoint, Endpoint)> = self
            .links
            .values()
            .filter_map(|link| {
                let source = mapping.get(&link.source.node)?;
                let target = mapping.get(&link.target.node)?;
                Some((
                    Endpoint::new(source.clone(), link.source.name.clone()),
                    Endpoint::new(target.clone(), link.target.name.clone()),
                ))
            })
            .collect();
        for (source, target) in internal {
            self.insert_link(source, target);
        }

        tracing::debug!(copies = ?created, "duplicated nodes");
        Ok(created)
    }

    /// Change the kind of `id`'s whole alias group and remap its endpoints.
    ///
    /// Returns the number of endpoint names rewritten.
    pub fn set_kind(&mut self, id: &str, kind: impl Into<String>) -> Result<usize> {
        self.require(id)?;
        let kind = kind.into();
        let new = self.patterns.spec(&kind).clone();

        let mut renamed = 0;
        for member in self.aliases_of(id) {
            let Some(node) = self.nodes.get_mut(&member) else {
                continue;
            };
            let old_kind = std::mem::replace(&mut node.kind, kind.clone());
            let old = self.patterns.spec(&old_kind).clone();
            renamed += remap_on_pattern_change(&member, &old, &new, self);
        }

        tracing::debug!(node = id, kind = %kind, renamed, "changed node kind");
        Ok(renamed)
    }

    /// Swap the pattern table, remapping every node whose pattern changed.
    ///
    /// Returns the number of endpoint names rewritten.
    pub fn replace_patterns(&mut self, patterns: PatternTable) -> usize {
        let affected: Vec<_> = self
            .nodes
            .values()
            .filter_map(|node| {
                let old = self.patterns.spec(&node.kind);
                let new = patterns.spec(&node.kind);
                (old != new).then(|| (node.id.clone(), old.clone(), new.clone()))
            })
            .collect();

        self.patterns = patterns;

        affected
            .into_iter()
            .map(|(id, old, new)| remap_on_pattern_change(&id, &old, &new, self))
            .sum()
    }

    // =========================================================================
    // Links
    // =========================================================================

    /// Next free endpoint name on `id`, shared across its alias group.
    pub fn next_endpoint_name(&self, id: &str) -> Result<String> {
        let node = self.require(id)?;
        Ok(allocate_endpoint(self, id, &node.kind))
    }

    /// Link `a` to `b`, allocating an endpoint name on each side.
    pub fn connect(&mut self, a: &str, b: &str) -> Result<LinkId> {
        let source = self.next_endpoint_name(a)?;
        let kind_b = self.require(b)?.kind.clone();

        let scope = AllocationScope::resolve(b, &*self);
        let target = if scope.contains(a) {
            // Same pool: the source name is not attached yet.
            let spec = self.patterns.spec(&kind_b);
            let mut used = collect_used_offsets(spec, &scope, &*self);
            used.extend(offset_for_name(spec, &source));
            name_for_offset(spec, next_free_offset(&used))
        } else {
            allocate_endpoint(&*self, b, &kind_b)
        };

        let id = self.insert_link(Endpoint::new(a, source), Endpoint::new(b, target));
        tracing::debug!(link = id, source = a, target = b, "connected");
        Ok(id)
    }

    /// Link `a` to `b` with caller-chosen endpoint names.
    pub fn connect_named(
        &mut self,
        a: &str,
        a_name: impl Into<String>,
        b: &str,
        b_name: impl Into<String>,
    ) -> Result<LinkId> {
        self.require(a)?;
        self.require(b)?;
        Ok(self.insert_link(Endpoint::new(a, a_name), Endpoint::new(b, b_name)))
    }

    pub fn disconnect(&mut self, link: LinkId) -> Result<Link> {
        self.links.remove(&link).ok_or(TopologyError::UnknownLink(link))
    }

    fn insert_link(&mut self, source: Endpoint, target: Endpoint) -> LinkId {
        let id = self.next_link;
        self.next_link += 1;
        self.links.insert(id, Link { id, source, target });
        id
    }

    /// Endpoint names held by `id`, in link order.
    pub fn endpoint_names(&self, id: &str) -> Vec<String> {
        self.connections_of(id).into_iter().map(|e| e.name).collect()
    }
}

// =============================================================================
// Host interfaces
// =============================================================================

impl PatternLookup for Topology {
    fn pattern_text(&self, kind: &str) -> &str {
        self.patterns.pattern_text(kind)
    }

    fn spec_for(&self, kind: &str) -> crate::pattern::PatternSpec {
        self.patterns.spec_for(kind)
    }
}

impl ConnectionEnumerator for Topology {
    fn connections_of(&self, entity: &str) -> Vec<EndpointRef> {
        self.links
            .values()
            .flat_map(|link| {
                Role::BOTH.into_iter().filter_map(move |role| {
                    let endpoint = link.endpoint(role);
                    (endpoint.node == entity).then(|| EndpointRef::new(link.id, role, endpoint.name.clone()))
                })
            })
            .collect()
    }
}

impl AliasResolver for Topology {
    /// Every node sharing `entity`'s group root. Recomputed on each call.
    fn aliases_of(&self, entity: &str) -> BTreeSet<EntityId> {
        let root = self
            .nodes
            .get(entity)
            .and_then(|node| node.alias_of.as_deref())
            .unwrap_or(entity);

        let mut members: BTreeSet<EntityId> = self
            .nodes
            .values()
            .filter(|node| node.id == root || node.alias_of.as_deref() == Some(root))
            .map(|node| node.id.clone())
            .collect();
        members.insert(entity.to_string());
        members
    }
}

impl EndpointWriter for Topology {
    fn set_endpoint_name(&mut self, link: LinkId, role: Role, name: String) {
        if let Some(link) = self.links.get_mut(&link) {
            link.endpoint_mut(role).name = name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology() -> Topology {
        let patterns = PatternTable::default()
            .with("router", "ge-0/0/{n:0}")
            .with("switch", "Ethernet{n:1-2},Uplink{n}");
        Topology::new(patterns)
    }

    #[test]
    fn connect_allocates_per_kind() {
        let mut topo = topology();
        topo.add_node("r1", "router", EntityCategory::Plain).unwrap();
        topo.add_node("h1", "host", EntityCategory::Plain).unwrap();

        let link = topo.connect("r1", "h1").unwrap();
        let link = topo.link(link).unwrap();
        assert_eq!(link.source.name, "ge-0/0/0");
        assert_eq!(link.target.name, "eth1");

        topo.connect("r1", "h1").unwrap();
        assert_eq!(topo.endpoint_names("r1"), vec!["ge-0/0/0", "ge-0/0/1"]);
        assert_eq!(topo.endpoint_names("h1"), vec!["eth1", "eth2"]);
    }

    #[test]
    fn freed_names_are_reused() {
        let mut topo = topology();
        topo.add_node("a", "host", EntityCategory::Plain).unwrap();
        topo.add_node("b", "host", EntityCategory::Plain).unwrap();

        let first = topo.connect("a", "b").unwrap();
        topo.connect("a", "b").unwrap();
        topo.disconnect(first).unwrap();

        assert_eq!(topo.next_endpoint_name("a").unwrap(), "eth1");
    }

    #[test]
    fn self_loop_gets_two_names() {
        let mut topo = topology();
        topo.add_node("s1", "switch", EntityCategory::Plain).unwrap();

        topo.connect("s1", "s1").unwrap();
        topo.connect("s1", "s1").unwrap();
        assert_eq!(topo.endpoint_names("s1"), vec!["Ethernet1", "Ethernet2", "Uplink1", "Uplink2"]);
    }

    #[test]
    fn aliases_share_one_pool() {
        let mut topo = topology();
        topo.add_node("r1", "router", EntityCategory::Plain).unwrap();
        topo.add_alias("r1-copy", "r1").unwrap();
        topo.add_alias("r1-copy2", "r1-copy").unwrap();
        topo.add_node("h1", "host", EntityCategory::Plain).unwrap();

        topo.connect("r1", "h1").unwrap();
        topo.connect("r1-copy", "h1").unwrap();
        topo.connect("h1", "r1-copy2").unwrap();

        assert_eq!(topo.endpoint_names("r1"), vec!["ge-0/0/0"]);
        assert_eq!(topo.endpoint_names("r1-copy"), vec!["ge-0/0/1"]);
        assert_eq!(topo.endpoint_names("r1-copy2"), vec!["ge-0/0/2"]);

        // Symmetric membership.
        let group = topo.aliases_of("r1-copy2");
        assert_eq!(group, topo.aliases_of("r1"));
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn alias_link_between_members_avoids_collision() {
        let mut topo = topology();
        topo.add_node("r1", "router", EntityCategory::Plain).unwrap();
        topo.add_alias("r1b", "r1").unwrap();

        let link = topo.connect("r1", "r1b").unwrap();
        let link = topo.link(link).unwrap();
        assert_eq!(link.source.name, "ge-0/0/0");
        assert_eq!(link.target.name, "ge-0/0/1");
    }

    #[test]
    fn set_kind_remaps_whole_group() {
        let mut topo = topology();
        topo.add_node("n1", "host", EntityCategory::Plain).unwrap();
        topo.add_alias("n1b", "n1").unwrap();
        topo.add_node("h", "host", EntityCategory::Plain).unwrap();
        topo.connect("n1", "h").unwrap();
        topo.connect("n1b", "h").unwrap();
        topo.connect_named("n1", "mgmt0", "h", "eth9").unwrap();

        let renamed = topo.set_kind("n1b", "router").unwrap();
        assert_eq!(renamed, 2);
        assert_eq!(topo.node("n1").unwrap().kind, "router");
        assert_eq!(topo.node("n1b").unwrap().kind, "router");
        assert_eq!(topo.endpoint_names("n1"), vec!["ge-0/0/0", "mgmt0"]);
        assert_eq!(topo.endpoint_names("n1b"), vec!["ge-0/0/1"]);
        // The peer keeps its names.
        assert_eq!(topo.endpoint_names("h"), vec!["eth1", "eth2", "eth9"]);
    }

    #[test]
    fn duplicate_copies_internal_links() {
        let mut topo = topology();
        topo.add_node("router1", "router", EntityCategory::Plain).unwrap();
        topo.add_node("router2", "router", EntityCategory::Plain).unwrap();
        topo.add_node("dummy1", "host", EntityCategory::Plain).unwrap();
        topo.connect("router1", "router2").unwrap();
        topo.connect("router1", "dummy1").unwrap();

        let copies = topo.duplicate(&["router2", "router1"]).unwrap();
        assert_eq!(copies, vec!["router3", "router4"]);

        // Only the router1-router2 link is internal to the selection.
        assert_eq!(topo.link_count(), 3);
        assert_eq!(topo.endpoint_names("router4"), vec!["ge-0/0/0"]);
        assert_eq!(topo.endpoint_names("router3"), vec!["ge-0/0/0"]);
    }

    #[test]
    fn duplicate_rejects_unknown_node() {
        let mut topo = topology();
        assert_eq!(topo.duplicate(&["ghost"]), Err(TopologyError::UnknownNode("ghost".into())));
    }

    #[test]
    fn rename_checks_uniqueness_and_rewires() {
        let mut topo = topology();
        topo.add_node("a", "host", EntityCategory::Plain).unwrap();
        topo.add_node("b", "host", EntityCategory::Plain).unwrap();
        topo.add_alias("a2", "a").unwrap();
        topo.connect("a", "b").unwrap();

        assert_eq!(topo.rename_node("a", "b"), Err(TopologyError::NameTaken("b".into())));

        topo.rename_node("a", "core").unwrap();
        assert!(!topo.contains("a"));
        assert_eq!(topo.endpoint_names("core"), vec!["eth1"]);
        assert_eq!(topo.node("a2").unwrap().alias_of.as_deref(), Some("core"));
        assert_eq!(topo.suggest_id("b", EntityCategory::Plain), "b1");
    }

    #[test]
    fn remove_node_drops_links_and_aliases() {
        let mut topo = topology();
        topo.add_node("a", "host", EntityCategory::Plain).unwrap();
        topo.add_alias("a2", "a").unwrap();
        topo.add_node("b", "host", EntityCategory::Plain).unwrap();
        topo.connect("a2", "b").unwrap();

        topo.remove_node("a").unwrap();
        assert_eq!(topo.node_count(), 1);
        assert_eq!(topo.link_count(), 0);
        assert!(topo.endpoint_names("b").is_empty());
    }

    #[test]
    fn replace_patterns_remaps_changed_kinds_only() {
        let mut topo = topology();
        topo.add_node("r1", "router", EntityCategory::Plain).unwrap();
        topo.add_node("h1", "host", EntityCategory::Plain).unwrap();
        topo.connect("r1", "h1").unwrap();

        let renamed = topo.replace_patterns(PatternTable::default().with("router", "xe-0/0/{n:0}"));
        assert_eq!(renamed, 1);
        assert_eq!(topo.endpoint_names("r1"), vec!["xe-0/0/0"]);
        assert_eq!(topo.endpoint_names("h1"), vec!["eth1"]);
    }

    #[test]
    fn unknown_nodes_are_errors() {
        let mut topo = topology();
        assert!(matches!(topo.connect("x", "y"), Err(TopologyError::UnknownNode(_))));
        assert!(matches!(topo.set_kind("x", "router"), Err(TopologyError::UnknownNode(_))));
        assert_eq!(topo.disconnect(42), Err(TopologyError::UnknownLink(42)));
        assert!(topo.add_node("x", "host", EntityCategory::Plain).is_ok());
        assert_eq!(
            topo.add_node("x", "host", EntityCategory::Plain),
            Err(TopologyError::NameTaken("x".into()))
        );
    }
}
