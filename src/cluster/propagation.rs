//! Round-based label propagation with externally persisted snapshots

use crate::cluster::{ClusterId, ClusterSet};
use crate::error::Result;
use crate::graph::{Adjacency, NodeId};
use crate::storage::snapshot::SnapshotStore;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Entity to label assignment as of one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    labels: Vec<Option<NodeId>>,
}

impl Snapshot {
    /// A snapshot with no entity assigned
    pub fn empty(node_count: usize) -> Self {
        Self {
            labels: vec![None; node_count],
        }
    }

    /// Round zero: every entity is its own label
    pub fn initial(node_count: usize) -> Self {
        Self {
            labels: (0..node_count).map(|i| Some(NodeId::from_index(i))).collect(),
        }
    }

    pub fn get(&self, node: NodeId) -> Option<NodeId> {
        self.labels.get(node.index()).copied().flatten()
    }

    pub fn set(&mut self, node: NodeId, label: NodeId) {
        self.labels[node.index()] = Some(label);
    }

    /// Full scan of assigned entities in handle order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, label)| label.map(|label| (NodeId::from_index(i), label)))
    }

    /// Number of assigned entities
    pub fn len(&self) -> usize {
        self.labels.iter().filter(|label| label.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.iter().all(Option::is_none)
    }

    /// Number of distinct labels in use
    pub fn label_count(&self) -> usize {
        let mut labels: Vec<NodeId> = self.iter().map(|(_, label)| label).collect();
        labels.sort_unstable();
        labels.dedup();
        labels.len()
    }
}

/// Result of one propagation round
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub snapshot: Snapshot,

    /// Entities whose label differs from the previous round
    pub changed: usize,

    /// Partner lookups that found no label in the previous round
    pub missing_votes: usize,
}

/// Tally votes for one entity: its own label plus one per labelled partner.
/// Ties go to the lowest label.
fn vote<A: Adjacency>(adjacency: &A, current: &Snapshot, node: NodeId) -> (Option<NodeId>, usize) {
    let mut tally: HashMap<NodeId, u32> = HashMap::new();
    let mut missing = 0;

    if let Some(own) = current.get(node) {
        *tally.entry(own).or_insert(0) += 1;
    }

    for &partner in adjacency.neighbors(node) {
        match current.get(partner) {
            Some(label) => *tally.entry(label).or_insert(0) += 1,
            None => missing += 1,
        }
    }

    let winner = tally
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(label, _)| label);

    (winner, missing)
}

/// Compute round k+1 from the frozen round-k snapshot
pub fn propagate_round<A: Adjacency>(adjacency: &A, current: &Snapshot) -> RoundOutcome {
    let node_count = adjacency.node_count();

    let votes: Vec<(Option<NodeId>, usize)> = (0..node_count)
        .into_par_iter()
        .map(|idx| vote(adjacency, current, NodeId::from_index(idx)))
        .collect();

    let mut snapshot = Snapshot::empty(node_count);
    let mut changed = 0;
    let mut missing_votes = 0;

    for (idx, (winner, missing)) in votes.into_iter().enumerate() {
        let node = NodeId::from_index(idx);
        missing_votes += missing;
        if let Some(label) = winner {
            snapshot.set(node, label);
        }
        if winner != current.get(node) {
            changed += 1;
        }
    }

    RoundOutcome {
        snapshot,
        changed,
        missing_votes,
    }
}

/// Iterative label propagation driver.
///
/// Only the current snapshot survives between rounds, and it always goes
/// through the store; adjacency is consulted afresh every round.
pub struct LabelPropagation<'a, A, S> {
    adjacency: &'a A,
    store: S,
    rounds: usize,
    stop_when_stable: bool,
}

impl<'a, A: Adjacency, S: SnapshotStore> LabelPropagation<'a, A, S> {
    pub fn new(adjacency: &'a A, store: S, rounds: usize) -> Self {
        Self {
            adjacency,
            store,
            rounds,
            stop_when_stable: false,
        }
    }

    /// Finish early once a round leaves every label unchanged
    pub fn stop_when_stable(mut self, stop: bool) -> Self {
        self.stop_when_stable = stop;
        self
    }

    /// Run all rounds and return the final snapshot.
    ///
    /// The store holds no rounds afterwards, whether the run succeeds or not.
    pub fn run(&mut self) -> Result<Snapshot> {
        let result = self.run_rounds();
        if result.is_err() {
            for round in 0..=self.rounds {
                if let Err(e) = self.store.discard(round) {
                    log::warn!("Failed to discard snapshot of round {}: {}", round, e);
                }
            }
        }
        result
    }

    fn run_rounds(&mut self) -> Result<Snapshot> {
        let node_count = self.adjacency.node_count();
        log::info!(
            "Starting label propagation: {} entities, {} rounds",
            node_count,
            self.rounds
        );

        self.store.save(0, &Snapshot::initial(node_count))?;

        let mut round = 0;
        while round < self.rounds {
            let current = self.store.load(round)?;
            let outcome = propagate_round(self.adjacency, &current);
            drop(current);

            self.store.save(round + 1, &outcome.snapshot)?;
            self.store.discard(round)?;
            round += 1;

            log::info!(
                "Round {}/{} complete: {} labels changed, {} distinct labels",
                round,
                self.rounds,
                outcome.changed,
                outcome.snapshot.label_count()
            );
            if outcome.missing_votes > 0 {
                log::debug!(
                    "Round {}: {} partner lookups had no label",
                    round,
                    outcome.missing_votes
                );
            }

            if self.stop_when_stable && outcome.changed == 0 {
                log::info!("Labels stable after round {}, stopping early", round);
                break;
            }
        }

        let last = self.store.load(round)?;
        self.store.discard(round)?;
        Ok(last)
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

/// Group entities by final label into core clusters.
///
/// Cluster ids follow ascending label order; each cluster is anchored at
/// its label entity.
pub fn clusters_from_snapshot<A: Adjacency>(adjacency: &A, snapshot: &Snapshot) -> ClusterSet {
    let mut clusters = ClusterSet::new(adjacency.node_count());

    let mut by_label: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    for (node, label) in snapshot.iter() {
        by_label.entry(label).or_default().push(node);
    }

    for (label, members) in by_label {
        let cluster: ClusterId = clusters.open(label);
        for node in members {
            clusters.admit_core(cluster, adjacency.side(node), node);
        }
    }

    log::info!(
        "Aggregated {} labelled entities into {} clusters",
        snapshot.len(),
        clusters.len()
    );

    clusters
}
