//! Interaction index construction

use crate::graph::entity::{NodeId, Side};
use crate::graph::index::InteractionIndex;
use std::collections::HashMap;

/// Builder for incrementally constructing an [`InteractionIndex`]
#[derive(Debug, Default)]
pub struct InteractionIndexBuilder {
    /// Mapping from side-local string IDs to provisional node indices
    id_to_index: [HashMap<String, u32>; 2],

    /// Node string IDs in first-seen order
    node_ids: Vec<String>,

    sides: Vec<Side>,

    /// Partner lists per provisional node, may hold repeats until build
    adjacency_lists: Vec<Vec<u32>>,
}

impl InteractionIndexBuilder {
    /// Create a new builder with room for `capacity` entities
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: [
                HashMap::with_capacity(capacity),
                HashMap::with_capacity(capacity),
            ],
            node_ids: Vec::with_capacity(capacity),
            sides: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
        }
    }

    /// Get or create the provisional index of an entity
    fn get_or_create_node(&mut self, side: Side, id: &str) -> u32 {
        let slot = match side {
            Side::A => 0,
            Side::B => 1,
        };
        if let Some(&idx) = self.id_to_index[slot].get(id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index[slot].insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());
        self.sides.push(side);
        self.adjacency_lists.push(Vec::new());

        idx
    }

    /// Record one observed interaction in both directions
    pub fn add_interaction(&mut self, a_id: &str, b_id: &str) {
        let a_idx = self.get_or_create_node(Side::A, a_id);
        let b_idx = self.get_or_create_node(Side::B, b_id);

        self.adjacency_lists[a_idx as usize].push(b_idx);
        self.adjacency_lists[b_idx as usize].push(a_idx);
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Build the compressed index in canonical node order
    pub fn build(self) -> InteractionIndex {
        let node_count = self.node_ids.len();

        // Reindex nodes: side A first, then id ascending
        let mut order: Vec<usize> = (0..node_count).collect();
        order.sort_unstable_by(|&x, &y| {
            (self.sides[x], &self.node_ids[x]).cmp(&(self.sides[y], &self.node_ids[y]))
        });

        let mut old_to_new = vec![0u32; node_count];
        for (new_idx, &old_idx) in order.iter().enumerate() {
            old_to_new[old_idx] = new_idx as u32;
        }

        let a_count = self.sides.iter().filter(|&&side| side == Side::A).count();

        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);
        let mut edges = Vec::new();
        let mut node_ids = Vec::with_capacity(node_count);

        let mut old_ids: Vec<Option<String>> = self.node_ids.into_iter().map(Some).collect();

        for &old_idx in &order {
            let mut partners: Vec<NodeId> = self.adjacency_lists[old_idx]
                .iter()
                .map(|&old| NodeId(old_to_new[old as usize]))
                .collect();
            // Set semantics: repeated interactions collapse
            partners.sort_unstable();
            partners.dedup();

            edges.extend_from_slice(&partners);
            offsets.push(edges.len());
            node_ids.push(old_ids[old_idx].take().unwrap_or_default());
        }

        log::debug!(
            "Built interaction index: {} side A, {} side B, {} distinct interactions",
            a_count,
            node_count - a_count,
            edges.len() / 2
        );

        InteractionIndex {
            a_count,
            offsets,
            edges,
            node_ids,
        }
    }
}
