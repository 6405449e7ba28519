//! Core cluster detection by breadth-first expansion

use crate::cluster::{ClusterId, ClusterSet};
use crate::graph::{Adjacency, NodeId};
use std::collections::VecDeque;

/// Seed order: highest degree first, ties by handle (i.e. by entity id)
fn seed_order<A: Adjacency>(adjacency: &A) -> Vec<NodeId> {
    let mut seeds: Vec<NodeId> = (0..adjacency.node_count()).map(NodeId::from_index).collect();
    seeds.sort_by(|&x, &y| {
        adjacency
            .degree(y)
            .cmp(&adjacency.degree(x))
            .then_with(|| x.cmp(&y))
    });
    seeds
}

/// Grow one cluster from `seed`.
///
/// Entities already core-assigned elsewhere act as bridges: they are
/// neither admitted nor expanded through.
fn expand<A: Adjacency>(
    adjacency: &A,
    clusters: &mut ClusterSet,
    cluster: ClusterId,
    seed: NodeId,
    stamp: &mut [u32],
    queue: &mut VecDeque<NodeId>,
) -> usize {
    let mut bridges = 0;
    queue.clear();
    queue.push_back(seed);

    while let Some(node) = queue.pop_front() {
        // Already a member of the current cluster
        if stamp[node.index()] == cluster.0 {
            continue;
        }

        if !clusters.admit_core(cluster, adjacency.side(node), node) {
            bridges += 1;
            continue;
        }
        stamp[node.index()] = cluster.0;

        for &partner in adjacency.neighbors(node) {
            if stamp[partner.index()] != cluster.0 {
                queue.push_back(partner);
            }
        }
    }

    bridges
}

/// Partition every entity into exactly one core cluster
pub fn find_core_clusters<A: Adjacency>(adjacency: &A) -> ClusterSet {
    let node_count = adjacency.node_count();
    log::info!("Forming core clusters over {} entities", node_count);

    let mut clusters = ClusterSet::new(node_count);
    let mut stamp = vec![u32::MAX; node_count];
    let mut queue = VecDeque::new();
    let mut bridges = 0;

    for seed in seed_order(adjacency) {
        if clusters.core_of(seed).is_some() {
            continue;
        }

        let cluster = clusters.open(seed);
        bridges += expand(adjacency, &mut clusters, cluster, seed, &mut stamp, &mut queue);

        if clusters.discard_if_empty(cluster) {
            continue;
        }

        if let Some(formed) = clusters.get(cluster) {
            log::debug!(
                "Core cluster {} seeded at {:?}: {} A, {} B",
                cluster,
                seed,
                formed.a_members.len(),
                formed.b_members.len()
            );
        }
    }

    log::info!(
        "Formed {} core clusters ({} bridge encounters)",
        clusters.len(),
        bridges
    );

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{InteractionIndex, Side};

    #[test]
    fn bridge_entity_collapses_into_one_cluster() {
        let index = InteractionIndex::from_interactions([("C1", "M1"), ("C2", "M1"), ("C2", "M2")]);
        let clusters = find_core_clusters(&index);

        assert_eq!(clusters.len(), 1);
        let cluster = clusters.get(ClusterId(0)).unwrap();
        assert_eq!(cluster.a_members.len(), 2);
        assert_eq!(cluster.b_members.len(), 2);
    }

    #[test]
    fn disconnected_groups_form_separate_clusters() {
        let index = InteractionIndex::from_interactions([
            ("C1", "M1"),
            ("C1", "M2"),
            ("C2", "M2"),
            ("C9", "M9"),
        ]);
        let clusters = find_core_clusters(&index);
        assert_eq!(clusters.len(), 2);

        // Highest degree seeds first: C1 and M2 both have degree 2, C1 sorts lower
        let first = clusters.get(ClusterId(0)).unwrap();
        assert_eq!(first.anchor, index.lookup(Side::A, "C1").unwrap());
        assert_eq!(first.size(), 4);

        let c9 = index.lookup(Side::A, "C9").unwrap();
        assert_eq!(clusters.core_of(c9), Some(ClusterId(1)));
    }

    #[test]
    fn every_entity_core_assigned_once() {
        let index = InteractionIndex::from_interactions([
            ("C1", "M1"),
            ("C2", "M2"),
            ("C3", "M2"),
            ("C3", "M3"),
            ("C4", "M4"),
        ]);
        let clusters = find_core_clusters(&index);
        for node in index.nodes() {
            let side = index.side(node);
            assert!(clusters.core_of(node).is_some());
            assert_eq!(clusters.memberships(side, node).len(), 1);
        }
    }
}
