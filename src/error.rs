//! Errors raised by [`Topology`](crate::topology::Topology) edits.
//!
//! The naming core itself never fails.

use thiserror::Error;

use crate::traits::LinkId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    #[error("unknown link {0}")]
    UnknownLink(LinkId),

    /// An id that must be fresh is already used.
    #[error("node id '{0}' is already taken")]
    NameTaken(String),
}

pub type Result<T> = std::result::Result<T, TopologyError>;
