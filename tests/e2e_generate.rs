//! End-to-end tests for subtask generation.
//!
//! Each test drives `build()` or `TaskGenerator` with a seeded `StdRng` and
//! checks the resulting graph structure.

mod common;

use rand::SeedableRng;
use rand::rngs::StdRng;
use taskgraph::{
    Catalog, Error, GeneratorConfig, Limits, NodeId, OpKind, SelectionScope, TaskGraph, build,
};

use common::{assert_contiguous, assert_subtask_invariants, depths, generator, standard};

fn build_seeded(root: OpKind, start: i64, limits: Limits, seed: u64) -> TaskGraph {
    let catalog = standard();
    let mut rng = StdRng::seed_from_u64(seed);
    build(&catalog, root, NodeId(start), limits, SelectionScope::new(), &mut rng).unwrap()
}

// ============================================================================
// 1. Exist root always binds an attribute
// ============================================================================

#[test]
fn test_exist_root_binds_attribute() {
    for seed in 0..50 {
        let task = build_seeded(OpKind::Exist, 0, Limits::new(20, 10), seed);
        let graph = &task.graph;

        assert_eq!(graph.kind(NodeId(0)), Some(OpKind::Exist));
        assert_eq!(graph.children(NodeId(0)), vec![NodeId(1)]);
        assert_eq!(graph.kind(NodeId(1)), Some(OpKind::Select));

        let lookups = graph.children(NodeId(1));
        assert!(!lookups.is_empty(), "seed {seed}: no binding");
        for lookup in lookups {
            assert!(graph.kind(lookup).unwrap().is_attribute_lookup());
            // lookups under a binding selection get a selection with nothing left to bind
            let inner = graph.children(lookup);
            assert_eq!(inner.len(), 1);
            assert_eq!(graph.kind(inner[0]), Some(OpKind::Select));
            assert_eq!(graph.out_degree(inner[0]), 0);
        }
    }
}

// ============================================================================
// 2. Depth budget of one stops at the root's selection
// ============================================================================

#[test]
fn test_lookup_root_with_depth_one() {
    for seed in 0..20 {
        let task = build_seeded(OpKind::GetCategory, 0, Limits::new(20, 1), seed);
        assert_eq!(task.graph.node_count(), 2);
        assert_eq!(task.graph.kind(NodeId(0)), Some(OpKind::GetCategory));
        assert_eq!(task.graph.kind(NodeId(1)), Some(OpKind::Select));
        assert_eq!(
            task.graph.edges().collect::<Vec<_>>(),
            vec![(NodeId(0), NodeId(1))]
        );
        assert_eq!(task.last_id, NodeId(1));
    }
}

// ============================================================================
// 3. IsSame compares two lookups of the same attribute
// ============================================================================

#[test]
fn test_is_same_children_share_kind() {
    for seed in 0..50 {
        let task = build_seeded(OpKind::IsSame, 0, Limits::default(), seed);
        let children = task.graph.children(NodeId(0));
        assert_eq!(children.len(), 2);
        let left = task.graph.kind(children[0]).unwrap();
        let right = task.graph.kind(children[1]).unwrap();
        assert!(left.is_attribute_lookup());
        assert_eq!(left, right);
    }
}

// ============================================================================
// 4. Ids start at start_id and stay contiguous
// ============================================================================

#[test]
fn test_ids_contiguous_from_start() {
    for seed in 0..30 {
        let task = build_seeded(OpKind::And, 100, Limits::default(), seed);
        assert_eq!(task.root, Some(NodeId(100)));
        assert_eq!(task.graph.first_id(), Some(NodeId(100)));
        assert_contiguous(&task, NodeId(100));
    }
}

#[test]
fn test_generator_numbers_subtasks_back_to_back() {
    let mut g = generator(GeneratorConfig::default(), 9);
    let first = g.random_subtask().unwrap();
    let second = g.boolean_subtask().unwrap();
    let third = g.subtask(OpKind::GetObject).unwrap();

    assert_eq!(first.root, Some(NodeId(0)));
    assert_eq!(second.root, Some(first.next_id()));
    assert_eq!(third.root, Some(second.next_id()));
    assert_eq!(g.next_id(), third.next_id());
    assert!(second.root_kind().unwrap().is_boolean());

    g.reset_ids(NodeId(0));
    assert_eq!(g.subtask(OpKind::Exist).unwrap().root, Some(NodeId(0)));
}

// ============================================================================
// 5. Structural invariants hold for every root and catalog
// ============================================================================

#[test]
fn test_invariants_standard_catalog() {
    let catalog = standard();
    for &root in catalog.roots() {
        for seed in 0..25 {
            let task = build_seeded(root, 0, Limits::default(), seed);
            assert_subtask_invariants(&catalog, &task);
        }
    }
}

#[test]
fn test_invariants_extended_catalog() {
    let catalog = Catalog::extended().unwrap();
    for &root in catalog.roots() {
        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let task = build(
                &catalog,
                root,
                NodeId(0),
                Limits::default(),
                SelectionScope::new(),
                &mut rng,
            )
            .unwrap();
            assert_subtask_invariants(&catalog, &task);
        }
    }
}

// ============================================================================
// 6. Soft bounds: overrun is limited to the forced expansion below the limit
// ============================================================================

#[test]
fn test_depth_overrun_is_bounded() {
    let catalog = standard();
    for max_depth in 1..6 {
        for &root in catalog.roots() {
            for seed in 0..20 {
                let task = build_seeded(root, 0, Limits::new(20, max_depth), seed);
                let deepest = depths(&task.graph, NodeId(0)).into_values().max().unwrap();
                // And -> Exist -> Select -> lookup -> Select below the limit
                assert!(
                    deepest <= max_depth + 4,
                    "{root} depth {deepest} with max_depth {max_depth}"
                );
            }
        }
    }
}

#[test]
fn test_tiny_node_budget_still_completes_arity() {
    for seed in 0..20 {
        let task = build_seeded(OpKind::And, 0, Limits::new(1, 10), seed);
        assert_eq!(task.graph.out_degree(NodeId(0)), 2);
        assert_subtask_invariants(&standard(), &task);
    }
}

// ============================================================================
// 7. select_limit keeps bindings to the ones Exist demands
// ============================================================================

#[test]
fn test_select_limit_binds_only_under_exist() {
    let config = GeneratorConfig {
        select_limit: true,
        ..Default::default()
    };
    let mut g = generator(config, 4);
    for _ in 0..40 {
        let task = g.random_subtask().unwrap();
        let graph = &task.graph;
        for node in graph.nodes().filter(|n| n.kind == OpKind::Select) {
            let parent = graph
                .edges()
                .find(|(_, to)| *to == node.id)
                .map(|(from, _)| graph.kind(from).unwrap());
            let expected = if parent == Some(OpKind::Exist) { 1 } else { 0 };
            assert_eq!(graph.out_degree(node.id), expected, "select at {}", node.id);
        }
    }
}

// ============================================================================
// 8. Degenerate roots
// ============================================================================

#[test]
fn test_nil_root_is_empty() {
    let task = build_seeded(OpKind::Nil, 5, Limits::default(), 0);
    assert!(task.is_empty());
    assert_eq!(task.root, None);
    assert_eq!(task.last_id, NodeId(4));
    assert_eq!(task.next_id(), NodeId(5));

    let at_zero = build_seeded(OpKind::Nil, 0, Limits::default(), 0);
    assert_eq!(at_zero.last_id, NodeId(-1));
}

#[test]
fn test_switch_root_rejected() {
    let catalog = standard();
    let mut rng = StdRng::seed_from_u64(0);
    let err = build(
        &catalog,
        OpKind::Switch,
        NodeId(0),
        Limits::default(),
        SelectionScope::new(),
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, Error::NotGeneratable(OpKind::Switch)));
}

#[test]
fn test_kind_missing_from_catalog_rejected() {
    let catalog = standard();
    let mut rng = StdRng::seed_from_u64(0);
    let err = build(
        &catalog,
        OpKind::Xor,
        NodeId(0),
        Limits::default(),
        SelectionScope::new(),
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, Error::CatalogError(_)));
}

#[test]
fn test_same_seed_same_graph() {
    let a = build_seeded(OpKind::And, 0, Limits::default(), 77);
    let b = build_seeded(OpKind::And, 0, Limits::default(), 77);
    assert_eq!(a, b);
}
