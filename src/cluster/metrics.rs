//! Cluster statistics and chattiness metrics

use crate::cluster::{ClusterId, ClusterSet};
use crate::graph::{Adjacency, NodeId};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary statistics of a final cluster set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_count: usize,
    pub entity_count: usize,
    pub membership_pairs: usize,
    pub duplicated_entities: usize,
    pub largest_cluster_size: usize,
    pub mean_cluster_size: f64,
    pub cluster_size_std_dev: f64,

    /// Mean fraction of an entity's partners it shares no cluster with
    pub mean_chattiness: f64,
}

/// Cluster ids per entity, sorted
fn membership_table(clusters: &ClusterSet) -> Vec<Vec<ClusterId>> {
    let mut table = vec![Vec::new(); clusters.node_count()];
    for cluster in clusters.iter() {
        for node in cluster.a_members.iter().chain(cluster.b_members.iter()) {
            table[node.index()].push(cluster.id);
        }
    }
    table
}

fn share_cluster(left: &[ClusterId], right: &[ClusterId]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            std::cmp::Ordering::Equal => return true,
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    false
}

fn chattiness_from_table<A: Adjacency>(
    node: NodeId,
    adjacency: &A,
    table: &[Vec<ClusterId>],
) -> Option<f64> {
    let partners = adjacency.neighbors(node);
    if partners.is_empty() {
        return None;
    }

    let own = &table[node.index()];
    let crossing = partners
        .iter()
        .filter(|partner| !share_cluster(own, &table[partner.index()]))
        .count();

    Some(crossing as f64 / partners.len() as f64)
}

/// Fraction of `node`'s interactions that cross cluster boundaries.
/// `None` for an entity without partners.
pub fn entity_chattiness<A: Adjacency>(
    node: NodeId,
    adjacency: &A,
    clusters: &ClusterSet,
) -> Option<f64> {
    chattiness_from_table(node, adjacency, &membership_table(clusters))
}

/// Calculate summary statistics for a cluster set
pub fn summarize<A: Adjacency>(adjacency: &A, clusters: &ClusterSet) -> ClusterSummary {
    let sizes: Vec<f64> = clusters.iter().map(|c| c.size() as f64).collect();

    let (mean_cluster_size, cluster_size_std_dev) = match sizes.len() {
        0 => (0.0, 0.0),
        1 => (sizes[0], 0.0),
        _ => (sizes.iter().mean(), sizes.iter().std_dev()),
    };

    let table = membership_table(clusters);
    let chattiness: Vec<f64> = (0..adjacency.node_count())
        .filter_map(|i| chattiness_from_table(NodeId::from_index(i), adjacency, &table))
        .collect();
    let mean_chattiness = if chattiness.is_empty() {
        0.0
    } else {
        chattiness.iter().mean()
    };

    ClusterSummary {
        cluster_count: clusters.len(),
        entity_count: adjacency.node_count(),
        membership_pairs: clusters.membership_pairs(),
        duplicated_entities: clusters.duplicated_entities(),
        largest_cluster_size: clusters.iter().map(|c| c.size()).max().unwrap_or(0),
        mean_cluster_size,
        cluster_size_std_dev,
        mean_chattiness,
    }
}
