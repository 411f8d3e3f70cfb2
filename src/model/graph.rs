//! Operator graph storage.
//!
//! An `OperatorGraph` is a plain node/edge set keyed by [`NodeId`]. Edges
//! point in construction order (parent -> child); the serializer flips them.
//! Both collections are ordered so iteration, export and comparison are
//! deterministic.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Attribute, GraphNode, NodeId, OpKind};

/// A directed acyclic graph of operator nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorGraph {
    nodes: BTreeMap<NodeId, OpKind>,
    edges: BTreeSet<(NodeId, NodeId)>,
}

impl OperatorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Returns the previous kind if `id` was already present.
    pub fn add_node(&mut self, id: NodeId, kind: OpKind) -> Option<OpKind> {
        self.nodes.insert(id, kind)
    }

    /// Insert a directed edge. Returns `false` if it already existed.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        self.edges.insert((from, to))
    }

    pub fn kind(&self, id: NodeId) -> Option<OpKind> {
        self.nodes.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = GraphNode> + '_ {
        self.nodes.iter().map(|(&id, &kind)| GraphNode::new(id, kind))
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.iter().copied()
    }

    /// Targets of `id`'s outgoing edges, in ascending id order.
    ///
    /// For a freshly built subtask this is left-to-right child order, since
    /// children are numbered in pre-order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.edges
            .range((id, NodeId(i64::MIN))..=(id, NodeId(i64::MAX)))
            .map(|&(_, to)| to)
            .collect()
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|&&(_, to)| to == id).count()
    }

    /// Nodes without incoming edges.
    pub fn sources(&self) -> Vec<NodeId> {
        let targets: BTreeSet<NodeId> = self.edges.iter().map(|&(_, to)| to).collect();
        self.nodes.keys().filter(|id| !targets.contains(id)).copied().collect()
    }

    /// Attribute kinds looked up anywhere in the graph.
    pub fn attributes(&self) -> BTreeSet<Attribute> {
        self.nodes.values().filter_map(|kind| kind.attribute()).collect()
    }

    pub fn first_id(&self) -> Option<NodeId> {
        self.nodes.keys().next().copied()
    }

    pub fn last_id(&self) -> Option<NodeId> {
        self.nodes.keys().next_back().copied()
    }

    /// Same graph with every edge reversed.
    pub fn reversed(&self) -> OperatorGraph {
        OperatorGraph {
            nodes: self.nodes.clone(),
            edges: self.edges.iter().map(|&(from, to)| (to, from)).collect(),
        }
    }

    /// Find a directed cycle, if any, returned as the closed id path.
    ///
    /// Also reports edges whose endpoints are not nodes of this graph as a
    /// one-element "cycle" on the dangling id, since such a graph is not a
    /// valid DAG either.
    pub fn find_cycle(&self) -> Option<Vec<NodeId>> {
        #[derive(Copy, Clone, PartialEq, Eq)]
        enum Mark {
            Temp,
            Perm,
        }

        fn dfs(
            v: NodeId,
            graph: &OperatorGraph,
            marks: &mut BTreeMap<NodeId, Mark>,
            stack: &mut Vec<NodeId>,
        ) -> Option<Vec<NodeId>> {
            match marks.get(&v) {
                Some(Mark::Perm) => return None,
                Some(Mark::Temp) => {
                    let start = stack.iter().position(|&s| s == v).unwrap_or(0);
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(v);
                    return Some(cycle);
                }
                None => {}
            }

            marks.insert(v, Mark::Temp);
            stack.push(v);
            for child in graph.children(v) {
                if let Some(cycle) = dfs(child, graph, marks, stack) {
                    return Some(cycle);
                }
            }
            stack.pop();
            marks.insert(v, Mark::Perm);
            None
        }

        for &(from, to) in &self.edges {
            for end in [from, to] {
                if !self.nodes.contains_key(&end) {
                    return Some(vec![end]);
                }
            }
        }

        let mut marks = BTreeMap::new();
        let mut stack = Vec::new();
        for id in self.nodes.keys() {
            stack.clear();
            if let Some(cycle) = dfs(*id, self, &mut marks, &mut stack) {
                return Some(cycle);
            }
        }
        None
    }

    pub fn is_acyclic(&self) -> bool {
        self.find_cycle().is_none()
    }
}

/// The result of one generation or composition call.
///
/// `root` is `None` only for an empty graph. `last_id` is the highest id the
/// call consumed; the next call should start at `last_id + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGraph {
    pub graph: OperatorGraph,
    pub root: Option<NodeId>,
    pub last_id: NodeId,
}

impl TaskGraph {
    /// An empty result that consumed no ids.
    pub fn empty(start_id: NodeId) -> Self {
        Self {
            graph: OperatorGraph::new(),
            root: None,
            last_id: start_id.prev(),
        }
    }

    /// A graph consisting of a single node that is its own root.
    pub fn single(id: NodeId, kind: OpKind) -> Self {
        let mut graph = OperatorGraph::new();
        graph.add_node(id, kind);
        Self {
            graph,
            root: Some(id),
            last_id: id,
        }
    }

    /// First id a following generation call may use.
    #[inline]
    pub fn next_id(&self) -> NodeId {
        self.last_id.next()
    }

    pub fn root_kind(&self) -> Option<OpKind> {
        self.root.and_then(|id| self.graph.kind(id))
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}
