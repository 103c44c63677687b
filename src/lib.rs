//! # Endpoint Naming & Identifier Allocation (bevy-portname)
//!
//! Names the interfaces of topology-diagram nodes from short patterns and
//! hands out collision-free names and node ids.
//!
//! ## Design
//!
//! A pattern compiles to ordered segments that partition an offset space:
//!
//! ```text
//! pattern   Ethernet{n:1-2},Uplink{n}
//!           ┌────────── segment 0 ─────────┬────── segment 1 ───────┐
//! offset    │     0            1           │   2         3     ...  │
//! name      │ Ethernet1    Ethernet2       │ Uplink1   Uplink2 ...  │
//!           └──────────────────────────────┴────────────────────────┘
//! ```
//!
//! Offsets decode back exactly, so allocation is "lowest offset not already
//! decoded from the scope", and a kind change re-renders each endpoint at
//! the same offset under the new pattern.
//!
//! ## Pure operations
//!
//! ```ignore
//! use bevy_portname::{parse_pattern, name_for_offset, offset_for_name};
//!
//! let spec = parse_pattern(Some("ge-0/0/{n:0}"));
//! assert_eq!(name_for_offset(&spec, 3), "ge-0/0/3");
//! assert_eq!(offset_for_name(&spec, "ge-0/0/3"), Some(3));
//! ```
//!
//! Hosts plug in through the callbacks in [`traits`]; [`Topology`] is a
//! ready-made in-memory host.

pub mod bevy;
pub mod codec;
pub mod error;
pub mod ident;
pub mod pattern;
pub mod pool;
pub mod remap;
pub mod table;
pub mod topology;
pub mod traits;

pub use codec::{name_for_offset, offset_for_name};
pub use error::TopologyError;
pub use ident::{split_trailing_digits, unique_id, EntityCategory, GROUP_MARKER};
pub use pattern::{parse_pattern, PatternSpec, Segment, DEFAULT_PATTERN, MAX_BOUND};
pub use pool::{allocate, allocate_endpoint, collect_used_offsets, next_free_offset, AllocationScope};
pub use remap::{plan_remap, remap_on_pattern_change, EndpointRename};
pub use table::PatternTable;
pub use topology::{Endpoint, Link, Node, Topology};
pub use traits::{
    AliasResolver, ConnectionEnumerator, EndpointRef, EndpointWriter, EntityId, LinkId, PatternLookup, Role,
};
