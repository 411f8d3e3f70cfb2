//! # Graph Builder
//!
//! Recursive, pre-order construction of one subtask graph from a root kind.
//!
//! ```text
//! build(root) ─┬─ add root at start_id
//!              └─ branch(root)
//!                   ├─ sample children            (sampler)
//!                   └─ for each non-Nil child:
//!                        id = last + 1, edge parent -> child
//!                        last = branch(child)     (depth + 1, count + 1)
//! ```
//!
//! Ids are contiguous, `[start_id, last_id]`, and assigned parent before
//! children, children left to right. Depth and node count are soft limits:
//! a node sampled at the boundary still expands its full arity.

use rand::Rng;
use tracing::debug;

use crate::catalog::Catalog;
use crate::model::{NodeId, OpKind, OperatorGraph, TaskGraph};
use crate::sampler::{Budget, SelectionScope, sample_children};
use crate::{Error, Result};

/// Soft size limits for one subtask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_nodes: usize,
    pub max_depth: usize,
}

impl Limits {
    pub fn new(max_nodes: usize, max_depth: usize) -> Self {
        Self {
            max_nodes,
            max_depth,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(20, 10)
    }
}

/// Build a subtask rooted at `root`, numbering nodes from `start_id`.
///
/// A `Nil` root yields an empty graph whose `last_id` is `start_id - 1`.
pub fn build<R: Rng + ?Sized>(
    catalog: &Catalog,
    root: OpKind,
    start_id: NodeId,
    limits: Limits,
    scope: SelectionScope,
    rng: &mut R,
) -> Result<TaskGraph> {
    if !root.is_generatable() {
        return Err(Error::NotGeneratable(root));
    }
    catalog.get(root)?;
    if root.is_nil() {
        return Ok(TaskGraph::empty(start_id));
    }

    let mut arena = Arena {
        catalog,
        rng,
        graph: OperatorGraph::new(),
    };
    arena.graph.add_node(start_id, root);
    let last_id = arena.branch(
        root,
        start_id,
        Budget::root(limits.max_nodes, limits.max_depth),
        scope,
    )?;

    let graph = arena.graph;
    debug!(
        %root,
        start = %start_id,
        last = %last_id,
        nodes = graph.node_count(),
        "built subtask"
    );
    Ok(TaskGraph {
        graph,
        root: Some(start_id),
        last_id,
    })
}

/// Append-only graph under construction.
struct Arena<'a, R: Rng + ?Sized> {
    catalog: &'a Catalog,
    rng: &'a mut R,
    graph: OperatorGraph,
}

impl<R: Rng + ?Sized> Arena<'_, R> {
    /// Expand the node `id` of `kind`; returns the highest id used below it.
    fn branch(
        &mut self,
        kind: OpKind,
        id: NodeId,
        budget: Budget,
        scope: SelectionScope,
    ) -> Result<NodeId> {
        let scope = if kind == OpKind::Exist {
            scope.require_binding()
        } else {
            scope
        };

        let children = sample_children(self.catalog, kind, budget, &scope, &mut *self.rng)?;

        let child_scope = if kind == OpKind::Select
            && children.iter().any(|child| child.is_attribute_lookup())
        {
            scope.bound()
        } else {
            scope
        };

        let mut last = id;
        let mut count = budget.count;
        for child in children {
            if child.is_nil() {
                continue;
            }
            let child_id = last.next();
            count += 1;
            self.graph.add_node(child_id, child);
            self.graph.add_edge(id, child_id);
            last = self.branch(child, child_id, budget.descend(count), child_scope.clone())?;
        }
        Ok(last)
    }
}
