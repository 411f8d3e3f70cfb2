//! # Switch Composition
//!
//! Combines a boolean condition graph and two branch graphs under a new
//! `Switch` node:
//!
//! ```text
//!   do_if.root ──┐
//!                ├──> switch ──> condition.root
//! do_else.root ──┘
//! ```
//!
//! The inputs are borrowed and never modified, so a composite can be fed
//! back in as a branch of a further switch. Their id ranges must already be
//! disjoint; the switch takes `condition.last_id + 1`, so the condition is
//! expected to be the most recently generated operand.

use tracing::debug;

use crate::model::{NodeId, OpKind, OperatorGraph, TaskGraph};
use crate::{Error, Result};

/// Merge `condition`, `do_if` and `do_else` under a new switch node.
///
/// Fails with [`Error::IdCollision`] if any id occurs in more than one
/// operand, or if the switch id is already taken.
pub fn compose_switch(
    condition: &TaskGraph,
    do_if: &TaskGraph,
    do_else: &TaskGraph,
) -> Result<TaskGraph> {
    let condition_root = condition.root.ok_or(Error::EmptyOperand("condition"))?;
    let do_if_root = do_if.root.ok_or(Error::EmptyOperand("do_if"))?;
    let do_else_root = do_else.root.ok_or(Error::EmptyOperand("do_else"))?;

    let mut graph = OperatorGraph::new();
    for operand in [do_if, do_else, condition] {
        union_into(&mut graph, &operand.graph)?;
    }

    let switch_id = condition.last_id.next();
    if graph.contains(switch_id) {
        return Err(Error::IdCollision(switch_id));
    }
    graph.add_node(switch_id, OpKind::Switch);
    graph.add_edge(do_if_root, switch_id);
    graph.add_edge(do_else_root, switch_id);
    graph.add_edge(switch_id, condition_root);

    debug!(
        switch = %switch_id,
        condition = %condition_root,
        do_if = %do_if_root,
        do_else = %do_else_root,
        nodes = graph.node_count(),
        "composed switch"
    );

    Ok(TaskGraph {
        graph,
        root: Some(switch_id),
        last_id: switch_id,
    })
}

fn union_into(target: &mut OperatorGraph, source: &OperatorGraph) -> Result<()> {
    for node in source.nodes() {
        if target.add_node(node.id, node.kind).is_some() {
            return Err(Error::IdCollision(node.id));
        }
    }
    for (from, to) in source.edges() {
        target.add_edge(from, to);
    }
    Ok(())
}

/// Ids shared by two graphs, in ascending order.
pub fn overlapping_ids(a: &OperatorGraph, b: &OperatorGraph) -> Vec<NodeId> {
    a.ids().filter(|id| b.contains(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_node_operands() {
        let do_if = TaskGraph::single(NodeId(0), OpKind::GetLoc);
        let do_else = TaskGraph::single(NodeId(1), OpKind::GetCategory);
        let condition = TaskGraph::single(NodeId(2), OpKind::Exist);

        let t = compose_switch(&condition, &do_if, &do_else).unwrap();
        assert_eq!(t.root, Some(NodeId(3)));
        assert_eq!(t.last_id, NodeId(3));
        assert_eq!(t.graph.node_count(), 4);
        assert_eq!(
            t.graph.edges().collect::<Vec<_>>(),
            vec![
                (NodeId(0), NodeId(3)),
                (NodeId(1), NodeId(3)),
                (NodeId(3), NodeId(2)),
            ]
        );
    }

    #[test]
    fn test_overlap_is_rejected() {
        let a = TaskGraph::single(NodeId(0), OpKind::GetLoc);
        let b = TaskGraph::single(NodeId(0), OpKind::GetObject);
        let c = TaskGraph::single(NodeId(1), OpKind::Exist);
        let err = compose_switch(&c, &a, &b).unwrap_err();
        assert!(matches!(err, Error::IdCollision(NodeId(0))));
        assert_eq!(overlapping_ids(&a.graph, &b.graph), vec![NodeId(0)]);
    }

    #[test]
    fn test_switch_id_collision() {
        // condition generated first, so its last_id + 1 is a branch id
        let condition = TaskGraph::single(NodeId(0), OpKind::Exist);
        let do_if = TaskGraph::single(NodeId(1), OpKind::GetLoc);
        let do_else = TaskGraph::single(NodeId(2), OpKind::GetLoc);
        let err = compose_switch(&condition, &do_if, &do_else).unwrap_err();
        assert!(matches!(err, Error::IdCollision(NodeId(1))));
    }

    #[test]
    fn test_empty_operand() {
        let empty = TaskGraph::empty(NodeId(0));
        let b = TaskGraph::single(NodeId(0), OpKind::GetLoc);
        let c = TaskGraph::single(NodeId(1), OpKind::Exist);
        let err = compose_switch(&c, &empty, &b).unwrap_err();
        assert!(matches!(err, Error::EmptyOperand("do_if")));
    }
}
