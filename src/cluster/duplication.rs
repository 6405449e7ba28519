//! Controlled duplication of entities into secondary clusters

use crate::cluster::{ClusterId, ClusterSet};
use crate::graph::{Adjacency, NodeId, Side};
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::HashMap;

/// Where an entity ends up after duplication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Cluster holding most of the entity's partners
    pub primary: ClusterId,

    /// Further clusters the entity is copied into, strongest first
    pub secondary: Vec<ClusterId>,
}

/// Decides primary and secondary cluster membership by interaction share
#[derive(Debug, Clone, Copy)]
pub struct DuplicationEngine {
    threshold: f64,
}

impl DuplicationEngine {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Interaction counts per cluster, strongest first, ties by ClusterId.
    ///
    /// Each partner counts toward its core cluster only.
    pub fn interaction_counts(
        &self,
        partners: &[NodeId],
        clusters: &ClusterSet,
    ) -> Vec<(ClusterId, usize)> {
        let mut counts: HashMap<ClusterId, usize> = HashMap::new();
        for &partner in partners {
            if let Some(cluster) = clusters.core_of(partner) {
                *counts.entry(cluster).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(ClusterId, usize)> = counts.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// Place one entity. `None` when it has no partners or none of them
    /// belongs to a cluster.
    pub fn place<A: Adjacency>(
        &self,
        node: NodeId,
        adjacency: &A,
        clusters: &ClusterSet,
    ) -> Option<Placement> {
        let partners = adjacency.neighbors(node);
        if partners.is_empty() {
            return None;
        }

        let ranked = self.interaction_counts(partners, clusters);
        let (&(primary, primary_count), rest) = ranked.split_first()?;
        let total = partners.len() as f64;
        let primary_count = primary_count as f64;

        let secondary = rest
            .iter()
            .filter(|&&(_, count)| {
                let count = count as f64;
                count > 0.0
                    && (count / primary_count >= self.threshold || count / total >= self.threshold)
            })
            .map(|&(cluster, _)| cluster)
            .collect();

        Some(Placement { primary, secondary })
    }

    /// Place every entity and return the expanded cluster set.
    ///
    /// Placements read only the frozen input; insertions are grouped per
    /// target cluster before being applied.
    pub fn apply<A: Adjacency>(&self, adjacency: &A, clusters: ClusterSet) -> ClusterSet {
        let node_count = adjacency.node_count();
        log::info!(
            "Applying duplication over {} entities at threshold {}",
            node_count,
            self.threshold
        );

        let additions: DashMap<ClusterId, Vec<(Side, NodeId)>> = DashMap::new();

        (0..node_count).into_par_iter().for_each(|idx| {
            let node = NodeId::from_index(idx);
            let Some(placement) = self.place(node, adjacency, &clusters) else {
                return;
            };
            let side = adjacency.side(node);
            for cluster in std::iter::once(placement.primary).chain(placement.secondary) {
                additions.entry(cluster).or_default().push((side, node));
            }
        });

        let mut result = clusters;
        let mut added = 0;
        for (cluster, members) in additions {
            for (side, node) in members {
                if result.insert(cluster, side, node) {
                    added += 1;
                }
            }
        }

        log::info!(
            "Duplication added {} memberships; {} entities now span several clusters",
            added,
            result.duplicated_entities()
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::InteractionIndex;

    /// Cores {C1, M1, C2} and {M2, C3} seeded by hand
    fn seeded(index: &InteractionIndex) -> ClusterSet {
        let id = |side, name| index.lookup(side, name).unwrap();
        let mut clusters = ClusterSet::new(index.node_count());
        let first = clusters.open(id(Side::A, "C1"));
        clusters.admit_core(first, Side::A, id(Side::A, "C1"));
        clusters.admit_core(first, Side::B, id(Side::B, "M1"));
        clusters.admit_core(first, Side::A, id(Side::A, "C2"));
        let second = clusters.open(id(Side::B, "M2"));
        clusters.admit_core(second, Side::B, id(Side::B, "M2"));
        clusters.admit_core(second, Side::A, id(Side::A, "C3"));
        clusters
    }

    #[test]
    fn split_entity_is_duplicated() {
        let index = InteractionIndex::from_interactions([
            ("C1", "M1"),
            ("C1", "M2"),
            ("C2", "M1"),
            ("C3", "M2"),
        ]);
        let clusters = seeded(&index);
        let c1 = index.lookup(Side::A, "C1").unwrap();

        let placement = DuplicationEngine::new(0.5)
            .place(c1, &index, &clusters)
            .unwrap();
        assert_eq!(placement.primary, ClusterId(0));
        assert_eq!(placement.secondary, vec![ClusterId(1)]);
    }

    #[test]
    fn dominant_primary_suppresses_duplication_above_ratio() {
        let index = InteractionIndex::from_interactions([
            ("C1", "M1"),
            ("C1", "M3"),
            ("C1", "M2"),
            ("C2", "M1"),
            ("C2", "M3"),
            ("C3", "M2"),
        ]);
        let mut clusters = seeded(&index);
        let m3 = index.lookup(Side::B, "M3").unwrap();
        clusters.admit_core(ClusterId(0), Side::B, m3);
        let c1 = index.lookup(Side::A, "C1").unwrap();

        // Counts 2 vs 1: ratios 0.5 against primary, 1/3 against total
        let at_half = DuplicationEngine::new(0.5).place(c1, &index, &clusters).unwrap();
        assert_eq!(at_half.secondary, vec![ClusterId(1)]);

        let above = DuplicationEngine::new(0.6).place(c1, &index, &clusters).unwrap();
        assert_eq!(above.primary, ClusterId(0));
        assert!(above.secondary.is_empty());
    }

    #[test]
    fn partners_without_core_cluster_are_ignored() {
        let index = InteractionIndex::from_interactions([("C1", "M1")]);
        let clusters = ClusterSet::new(index.node_count());
        let c1 = index.lookup(Side::A, "C1").unwrap();
        assert_eq!(DuplicationEngine::new(0.3).place(c1, &index, &clusters), None);
    }

    #[test]
    fn apply_keeps_core_and_adds_secondaries() {
        let index = InteractionIndex::from_interactions([
            ("C1", "M1"),
            ("C1", "M2"),
            ("C2", "M1"),
            ("C3", "M2"),
        ]);
        let clusters = seeded(&index);
        let before = clusters.membership_pairs();

        let result = DuplicationEngine::new(0.5).apply(&index, clusters);
        let c1 = index.lookup(Side::A, "C1").unwrap();
        assert_eq!(
            result.memberships(Side::A, c1),
            vec![ClusterId(0), ClusterId(1)]
        );
        assert_eq!(result.core_of(c1), Some(ClusterId(0)));
        assert!(result.membership_pairs() > before);
    }
}
