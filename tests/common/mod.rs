//! Shared invariant checks for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use taskgraph::{Catalog, GeneratorConfig, NodeId, OpKind, OperatorGraph, TaskGenerator, TaskGraph};

pub fn standard() -> Arc<Catalog> {
    Arc::new(Catalog::standard().expect("standard catalog"))
}

pub fn generator(config: GeneratorConfig, seed: u64) -> TaskGenerator<StdRng> {
    let catalog = Arc::new(config.catalog().expect("catalog"));
    TaskGenerator::with_rng(catalog, config, StdRng::seed_from_u64(seed)).expect("generator")
}

/// Ids are exactly `first..=last_id`.
pub fn assert_contiguous(task: &TaskGraph, first: NodeId) {
    let ids: Vec<i64> = task.graph.ids().map(|id| id.0).collect();
    let expected: Vec<i64> = (first.0..=task.last_id.0).collect();
    assert_eq!(ids, expected, "ids are not contiguous");
}

/// Depth of every node below `root`, with the root at depth 1.
pub fn depths(graph: &OperatorGraph, root: NodeId) -> BTreeMap<NodeId, usize> {
    let mut out = BTreeMap::new();
    let mut stack = vec![(root, 1usize)];
    while let Some((id, depth)) = stack.pop() {
        let entry = out.entry(id).or_insert(depth);
        if depth > *entry {
            *entry = depth;
        }
        for child in graph.children(id) {
            stack.push((child, depth + 1));
        }
    }
    out
}

/// Structural invariants of a freshly built subtask.
pub fn assert_subtask_invariants(catalog: &Catalog, task: &TaskGraph) {
    let graph = &task.graph;
    assert!(graph.is_acyclic(), "cycle: {:?}", graph.find_cycle());

    let Some(root) = task.root else {
        assert!(graph.is_empty());
        return;
    };
    assert_eq!(graph.sources(), vec![root], "subtask must have a single root");
    assert_contiguous(task, root);

    for node in graph.nodes() {
        let children = graph.children(node.id);
        let kinds: Vec<OpKind> = children.iter().map(|c| graph.kind(*c).unwrap()).collect();
        let spec = catalog.get(node.kind).unwrap();

        if node.kind == OpKind::Select {
            assert!(kinds.len() <= spec.arity);
            assert!(kinds.iter().all(|k| k.is_attribute_lookup()), "{kinds:?}");
            let mut unique = kinds.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), kinds.len(), "selection bound an attribute twice: {kinds:?}");
        } else {
            assert_eq!(kinds.len(), spec.arity, "{} at {} has {kinds:?}", node.kind, node.id);
        }

        if spec.same_children_kind {
            assert!(kinds.windows(2).all(|w| w[0] == w[1]), "{kinds:?}");
        }

        if node.kind == OpKind::Exist {
            let select = children[0];
            assert!(
                graph.out_degree(select) >= 1,
                "Exist at {} did not bind an attribute",
                node.id
            );
        }
    }
}
