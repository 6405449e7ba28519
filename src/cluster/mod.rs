//! Cluster formation and duplication

pub mod detection;
pub mod duplication;
pub mod metrics;
pub mod propagation;

use crate::graph::{NodeId, Side};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a cluster within a [`ClusterSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterId(pub u32);

impl ClusterId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A group of densely interacting entities from both sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub id: ClusterId,

    /// Seed entity (core builder) or winning label (propagation)
    pub anchor: NodeId,

    pub a_members: BTreeSet<NodeId>,
    pub b_members: BTreeSet<NodeId>,
}

impl Cluster {
    fn new(id: ClusterId, anchor: NodeId) -> Self {
        Self {
            id,
            anchor,
            a_members: BTreeSet::new(),
            b_members: BTreeSet::new(),
        }
    }

    pub fn members(&self, side: Side) -> &BTreeSet<NodeId> {
        match side {
            Side::A => &self.a_members,
            Side::B => &self.b_members,
        }
    }

    fn members_mut(&mut self, side: Side) -> &mut BTreeSet<NodeId> {
        match side {
            Side::A => &mut self.a_members,
            Side::B => &mut self.b_members,
        }
    }

    pub fn contains(&self, side: Side, node: NodeId) -> bool {
        self.members(side).contains(&node)
    }

    pub fn size(&self) -> usize {
        self.a_members.len() + self.b_members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a_members.is_empty() && self.b_members.is_empty()
    }
}

/// Clusters plus the core assignment that produced them.
///
/// Every entity has at most one core cluster and that assignment never
/// changes once made; membership beyond the core one comes from duplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSet {
    clusters: Vec<Cluster>,
    core: Vec<Option<ClusterId>>,
}

impl ClusterSet {
    /// An empty set for an index with `node_count` entities
    pub fn new(node_count: usize) -> Self {
        Self {
            clusters: Vec::new(),
            core: vec![None; node_count],
        }
    }

    /// Start a new, empty cluster
    pub fn open(&mut self, anchor: NodeId) -> ClusterId {
        let id = ClusterId(self.clusters.len() as u32);
        self.clusters.push(Cluster::new(id, anchor));
        id
    }

    /// Drop the most recently opened cluster if nothing was admitted to it
    pub(crate) fn discard_if_empty(&mut self, id: ClusterId) -> bool {
        let is_last = self.clusters.len() == id.index() + 1;
        if is_last && self.clusters[id.index()].is_empty() {
            self.clusters.pop();
            return true;
        }
        false
    }

    /// Admit `node` as a structural member of `cluster`.
    ///
    /// Returns false and leaves everything untouched when the node is
    /// already core-assigned to a different cluster.
    pub fn admit_core(&mut self, cluster: ClusterId, side: Side, node: NodeId) -> bool {
        match self.core[node.index()] {
            Some(existing) if existing != cluster => false,
            _ => {
                self.core[node.index()] = Some(cluster);
                self.clusters[cluster.index()]
                    .members_mut(side)
                    .insert(node);
                true
            }
        }
    }

    /// Add a non-structural membership; returns whether it was new
    pub fn insert(&mut self, cluster: ClusterId, side: Side, node: NodeId) -> bool {
        self.clusters[cluster.index()].members_mut(side).insert(node)
    }

    pub fn core_of(&self, node: NodeId) -> Option<ClusterId> {
        self.core.get(node.index()).copied().flatten()
    }

    pub fn get(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.core.len()
    }

    /// Every cluster holding `node`, in ClusterId order
    pub fn memberships(&self, side: Side, node: NodeId) -> Vec<ClusterId> {
        self.clusters
            .iter()
            .filter(|cluster| cluster.contains(side, node))
            .map(|cluster| cluster.id)
            .collect()
    }

    /// Total number of (entity, cluster) membership pairs
    pub fn membership_pairs(&self) -> usize {
        self.clusters.iter().map(Cluster::size).sum()
    }

    /// Number of entities that belong to more than one cluster
    pub fn duplicated_entities(&self) -> usize {
        let mut counts = vec![0u32; self.core.len()];
        for cluster in &self.clusters {
            for node in cluster.a_members.iter().chain(cluster.b_members.iter()) {
                counts[node.index()] += 1;
            }
        }
        counts.into_iter().filter(|&count| count > 1).count()
    }
}
