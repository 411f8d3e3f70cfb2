//! Node in an operator graph.

use serde::{Deserialize, Serialize};

use super::OpKind;

/// Node identifier.
///
/// Materialized nodes always carry non-negative ids. The signed
/// representation lets an empty generation report `last_id = start_id - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl NodeId {
    #[inline]
    pub fn next(self) -> NodeId {
        NodeId(self.0 + 1)
    }

    #[inline]
    pub fn prev(self) -> NodeId {
        NodeId(self.0 - 1)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(raw: i64) -> Self {
        NodeId(raw)
    }
}

/// A node: an id paired with its operator kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub kind: OpKind,
}

impl GraphNode {
    pub fn new(id: NodeId, kind: OpKind) -> Self {
        Self { id, kind }
    }
}
