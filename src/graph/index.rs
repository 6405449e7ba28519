//! Memory-efficient bipartite interaction index

use crate::graph::builder::InteractionIndexBuilder;
use crate::graph::entity::{EntityKey, NodeId, Side};
use std::mem;
use std::ops::Range;

/// Read-only adjacency consumed by the clustering engines.
///
/// Any backing that can answer "who are this entity's partners" satisfies
/// the engines; [`InteractionIndex`] is the in-memory implementation.
pub trait Adjacency: Sync {
    /// Number of entities across both sides
    fn node_count(&self) -> usize;

    fn side(&self, node: NodeId) -> Side;

    /// Distinct partners of `node`, sorted ascending
    fn neighbors(&self, node: NodeId) -> &[NodeId];

    fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }
}

/// Compressed sparse representation of the undirected bipartite graph.
///
/// Side A entities occupy handles `0..a_count`, side B the rest; within a
/// side handles are ordered by id.
#[derive(Debug, Clone)]
pub struct InteractionIndex {
    /// Number of side A entities
    pub(crate) a_count: usize,

    /// offsets[i] to offsets[i+1] defines the partner range for node i
    pub(crate) offsets: Vec<usize>,

    /// Concatenated, sorted partner lists
    pub(crate) edges: Vec<NodeId>,

    /// Original string id of each node
    pub(crate) node_ids: Vec<String>,
}

impl InteractionIndex {
    /// Build an index from `(A-id, B-id)` pairs
    pub fn from_interactions<I, S, T>(interactions: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut builder = InteractionIndexBuilder::default();
        for (a, b) in interactions {
            builder.add_interaction(a.as_ref(), b.as_ref());
        }
        builder.build()
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    /// Number of distinct (A, B) pairs
    pub fn interaction_count(&self) -> usize {
        self.edges.len() / 2
    }

    pub fn side_count(&self, side: Side) -> usize {
        self.side_range(side).len()
    }

    fn side_range(&self, side: Side) -> Range<usize> {
        match side {
            Side::A => 0..self.a_count,
            Side::B => self.a_count..self.node_ids.len(),
        }
    }

    /// All handles, side A first
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.node_count()).map(NodeId::from_index)
    }

    pub fn entity_id(&self, node: NodeId) -> &str {
        &self.node_ids[node.index()]
    }

    pub fn key(&self, node: NodeId) -> EntityKey {
        EntityKey::new(Adjacency::side(self, node), self.entity_id(node))
    }

    /// Resolve a raw id on the given side
    pub fn lookup(&self, side: Side, id: &str) -> Option<NodeId> {
        let range = self.side_range(side);
        let start = range.start;
        self.node_ids[range]
            .binary_search_by(|probe| probe.as_str().cmp(id))
            .ok()
            .map(|pos| NodeId::from_index(start + pos))
    }

    pub fn lookup_key(&self, key: &EntityKey) -> Option<NodeId> {
        self.lookup(key.side, &key.id)
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = self.offsets.capacity() * mem::size_of::<usize>();
        let edges = self.edges.capacity() * mem::size_of::<NodeId>();
        let ids = self.node_ids.iter().map(|s| s.capacity()).sum::<usize>();

        base + offsets + edges + ids
    }
}

impl Adjacency for InteractionIndex {
    fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    fn side(&self, node: NodeId) -> Side {
        if node.index() < self.a_count {
            Side::A
        } else {
            Side::B
        }
    }

    fn neighbors(&self, node: NodeId) -> &[NodeId] {
        let start = self.offsets[node.index()];
        let end = self.offsets[node.index() + 1];
        &self.edges[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InteractionIndex {
        InteractionIndex::from_interactions([
            ("C2", "M1"),
            ("C1", "M1"),
            ("C2", "M2"),
            ("C2", "M1"),
        ])
    }

    #[test]
    fn canonical_order_and_lookup() {
        let index = sample();
        assert_eq!(index.node_count(), 4);
        assert_eq!(index.side_count(Side::A), 2);
        assert_eq!(index.lookup(Side::A, "C1"), Some(NodeId(0)));
        assert_eq!(index.lookup(Side::A, "C2"), Some(NodeId(1)));
        assert_eq!(index.lookup(Side::B, "M1"), Some(NodeId(2)));
        assert_eq!(index.lookup(Side::B, "C1"), None);
        assert_eq!(index.key(NodeId(3)).to_string(), "B:M2");
    }

    #[test]
    fn repeated_pairs_are_idempotent() {
        let index = sample();
        assert_eq!(index.interaction_count(), 3);
        let c2 = index.lookup(Side::A, "C2").unwrap();
        assert_eq!(index.degree(c2), 2);
    }

    #[test]
    fn adjacency_is_symmetric() {
        let index = sample();
        for node in index.nodes() {
            for &partner in index.neighbors(node) {
                assert_ne!(index.side(node), index.side(partner));
                assert!(index.neighbors(partner).contains(&node));
            }
        }
    }

    #[test]
    fn same_raw_id_on_both_sides() {
        let index = InteractionIndex::from_interactions([("X", "X")]);
        let a = index.lookup(Side::A, "X").unwrap();
        let b = index.lookup(Side::B, "X").unwrap();
        assert_ne!(a, b);
        assert_eq!(index.neighbors(a), &[b]);
    }
}
