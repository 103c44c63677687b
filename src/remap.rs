//! Remap coordinator — re-encode endpoint names after a pattern change.
//!
//! The Nth endpoint stays the Nth endpoint: names are decoded to offsets
//! under the old pattern and rendered again under the new one. Literal
//! numbers are not preserved.

use crate::codec::{name_for_offset, offset_for_name};
use crate::pattern::PatternSpec;
use crate::traits::{ConnectionEnumerator, EndpointWriter, LinkId, Role};

/// One endpoint rename produced by [`plan_remap`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointRename {
    pub link: LinkId,
    pub role: Role,
    pub from: String,
    pub to: String,
}

/// Renames needed to move `entity`'s endpoints from `old` to `new`.
///
/// Endpoints that do not decode under `old` are left out, as are endpoints
/// whose name would not change.
pub fn plan_remap(
    entity: &str,
    old: &PatternSpec,
    new: &PatternSpec,
    connections: &impl ConnectionEnumerator,
) -> Vec<EndpointRename> {
    connections
        .connections_of(entity)
        .into_iter()
        .filter_map(|endpoint| {
            let offset = offset_for_name(old, &endpoint.name)?;
            let to = name_for_offset(new, offset);
            (to != endpoint.name).then(|| EndpointRename {
                link: endpoint.link,
                role: endpoint.role,
                from: endpoint.name,
                to,
            })
        })
        .collect()
}

/// Rewrite `entity`'s endpoint names in place. Returns the number renamed.
///
/// Not transactional: renames are applied one at a time.
pub fn remap_on_pattern_change<S>(entity: &str, old: &PatternSpec, new: &PatternSpec, store: &mut S) -> usize
where
    S: ConnectionEnumerator + EndpointWriter,
{
    let plan = plan_remap(entity, old, new, &*store);
    let count = plan.len();
    for rename in plan {
        tracing::debug!(
            entity,
            link = rename.link,
            role = ?rename.role,
            from = %rename.from,
            to = %rename.to,
            "remapped endpoint"
        );
        store.set_endpoint_name(rename.link, rename.role, rename.to);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_pattern;
    use crate::traits::EndpointRef;

    /// Endpoints of a single entity.
    #[derive(Default)]
    struct Endpoints(Vec<EndpointRef>);

    impl ConnectionEnumerator for Endpoints {
        fn connections_of(&self, _entity: &str) -> Vec<EndpointRef> {
            self.0.clone()
        }
    }

    impl EndpointWriter for Endpoints {
        fn set_endpoint_name(&mut self, link: LinkId, role: Role, name: String) {
            if let Some(endpoint) = self.0.iter_mut().find(|e| e.link == link && e.role == role) {
                endpoint.name = name;
            }
        }
    }

    fn names(endpoints: &Endpoints) -> Vec<&str> {
        endpoints.0.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn kind_change_keeps_relative_order() {
        let mut store = Endpoints(vec![EndpointRef::new(1, Role::Source, "eth1")]);
        let old = parse_pattern(Some("eth{n}"));
        let new = parse_pattern(Some("ge-0/0/{n}"));

        assert_eq!(remap_on_pattern_change("r1", &old, &new, &mut store), 1);
        assert_eq!(names(&store), vec!["ge-0/0/1"]);
    }

    #[test]
    fn offsets_not_numbers_are_preserved() {
        let mut store = Endpoints(vec![
            EndpointRef::new(1, Role::Source, "eth1"),
            EndpointRef::new(2, Role::Target, "eth3"),
        ]);
        let old = parse_pattern(Some("eth{n}"));
        let new = parse_pattern(Some("xe-0/0/{n:0}"));

        remap_on_pattern_change("r1", &old, &new, &mut store);
        assert_eq!(names(&store), vec!["xe-0/0/0", "xe-0/0/2"]);
    }

    #[test]
    fn overflowing_names_stay_untouched() {
        let huge = format!("ethx{}", usize::MAX);
        let mut store = Endpoints(vec![
            EndpointRef::new(1, Role::Source, huge.clone()),
            EndpointRef::new(2, Role::Source, "eth2"),
        ]);
        let old = parse_pattern(Some("eth{n:1-2},ethx{n}"));
        let new = parse_pattern(Some("Gi{n}"));

        assert_eq!(remap_on_pattern_change("r1", &old, &new, &mut store), 1);
        assert_eq!(names(&store), vec![huge.as_str(), "Gi2"]);
    }

    #[test]
    fn undecodable_endpoints_stay_untouched() {
        let mut store = Endpoints(vec![
            EndpointRef::new(1, Role::Source, "mgmt0"),
            EndpointRef::new(2, Role::Source, "eth2"),
        ]);
        let old = parse_pattern(Some("eth{n}"));
        let new = parse_pattern(Some("Gi{n}"));

        assert_eq!(remap_on_pattern_change("r1", &old, &new, &mut store), 1);
        assert_eq!(names(&store), vec!["mgmt0", "Gi2"]);
    }

    #[test]
    fn self_loop_remaps_both_roles() {
        let mut store = Endpoints(vec![
            EndpointRef::new(7, Role::Source, "eth1"),
            EndpointRef::new(7, Role::Target, "eth2"),
        ]);
        let old = parse_pattern(Some("eth{n}"));
        let new = parse_pattern(Some("p{n:0}"));

        remap_on_pattern_change("r1", &old, &new, &mut store);
        assert_eq!(names(&store), vec!["p0", "p1"]);
    }

    #[test]
    fn identical_patterns_plan_nothing() {
        let store = Endpoints(vec![EndpointRef::new(1, Role::Source, "eth1")]);
        let spec = parse_pattern(Some("eth{n}"));
        assert!(plan_remap("r1", &spec, &spec, &store).is_empty());
    }
}
