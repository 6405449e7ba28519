use interaction_clusters::cluster::detection::find_core_clusters;
use interaction_clusters::cluster::duplication::DuplicationEngine;
use interaction_clusters::cluster::propagation::LabelPropagation;
use interaction_clusters::pipeline::{run_in_memory, run_iterative};
use interaction_clusters::storage::MemorySnapshotStore;
use interaction_clusters::{Adjacency, Config, InteractionIndex, Mode};
use petgraph::graph::UnGraph;
use proptest::prelude::*;

fn interactions() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((0u8..10, 0u8..10), 1..40).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(a, b)| (format!("C{}", a), format!("M{}", b)))
            .collect()
    })
}

fn build(pairs: &[(String, String)]) -> InteractionIndex {
    InteractionIndex::from_interactions(pairs.iter().map(|(a, b)| (a.as_str(), b.as_str())))
}

proptest! {
    #[test]
    fn adjacency_is_symmetric(pairs in interactions()) {
        let index = build(&pairs);
        for node in index.nodes() {
            for &partner in index.neighbors(node) {
                prop_assert!(index.neighbors(partner).contains(&node));
            }
        }
        for (a, b) in &pairs {
            let a = index.lookup(interaction_clusters::Side::A, a).unwrap();
            let b = index.lookup(interaction_clusters::Side::B, b).unwrap();
            prop_assert!(index.neighbors(a).contains(&b));
        }
    }

    #[test]
    fn core_partition_is_complete(pairs in interactions(), threshold in 0.05f64..=1.0) {
        let index = build(&pairs);
        let core = find_core_clusters(&index);
        for node in index.nodes() {
            let side = index.side(node);
            prop_assert_eq!(core.memberships(side, node).len(), 1);
        }

        let full = DuplicationEngine::new(threshold).apply(&index, core.clone());
        for node in index.nodes() {
            let side = index.side(node);
            prop_assert!(!full.memberships(side, node).is_empty());
            prop_assert_eq!(full.core_of(node), core.core_of(node));
        }
    }

    #[test]
    fn core_clusters_are_connected_components(pairs in interactions()) {
        let index = build(&pairs);
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let handles: Vec<_> = index.nodes().map(|_| graph.add_node(())).collect();
        for node in index.nodes() {
            for &partner in index.neighbors(node) {
                if node < partner {
                    graph.add_edge(handles[node.index()], handles[partner.index()], ());
                }
            }
        }

        let core = find_core_clusters(&index);
        prop_assert_eq!(core.len(), petgraph::algo::connected_components(&graph));
    }

    #[test]
    fn lower_threshold_never_shrinks_membership(
        pairs in interactions(),
        low in 0.05f64..=1.0,
        high in 0.05f64..=1.0,
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let index = build(&pairs);

        for mode in [Mode::InMemory, Mode::Iterative] {
            let loose = Config::new(mode, 3, low);
            let strict = Config::new(mode, 3, high);
            let loose = match mode {
                Mode::InMemory => run_in_memory(&index, &loose).unwrap(),
                Mode::Iterative => run_iterative(&index, &loose, MemorySnapshotStore::default()).unwrap(),
            };
            let strict = match mode {
                Mode::InMemory => run_in_memory(&index, &strict).unwrap(),
                Mode::Iterative => run_iterative(&index, &strict, MemorySnapshotStore::default()).unwrap(),
            };
            prop_assert!(loose.membership_pairs() >= strict.membership_pairs());
        }
    }

    #[test]
    fn duplication_is_idempotent(pairs in interactions(), threshold in 0.05f64..=1.0) {
        let index = build(&pairs);
        let engine = DuplicationEngine::new(threshold);
        let once = engine.apply(&index, find_core_clusters(&index));
        let twice = engine.apply(&index, once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn label_propagation_is_deterministic(pairs in interactions(), rounds in 1usize..6) {
        let index = build(&pairs);
        let first = LabelPropagation::new(&index, MemorySnapshotStore::default(), rounds)
            .run()
            .unwrap();
        let second = LabelPropagation::new(&index, MemorySnapshotStore::default(), rounds)
            .run()
            .unwrap();
        prop_assert_eq!(first, second);
    }
}
