//! End-to-end clustering runs for both modes

use crate::cluster::detection::find_core_clusters;
use crate::cluster::duplication::DuplicationEngine;
use crate::cluster::propagation::{clusters_from_snapshot, LabelPropagation};
use crate::cluster::ClusterSet;
use crate::config::{Config, Mode};
use crate::error::Result;
use crate::graph::{Adjacency, InteractionIndex};
use crate::storage::snapshot::{CsvSnapshotStore, SnapshotStore};
use std::path::Path;

/// Core clusters by breadth-first expansion, then duplication
pub fn run_in_memory<A: Adjacency>(adjacency: &A, config: &Config) -> Result<ClusterSet> {
    config.validate()?;
    Ok(in_memory(adjacency, config))
}

/// Label propagation through `store`, then duplication
pub fn run_iterative<A: Adjacency, S: SnapshotStore>(
    adjacency: &A,
    config: &Config,
    store: S,
) -> Result<ClusterSet> {
    config.validate()?;
    iterative(adjacency, config, store)
}

/// Run the configured mode; iterative rounds are kept as CSV files in `work_dir`
pub fn run(index: &InteractionIndex, config: &Config, work_dir: &Path) -> Result<ClusterSet> {
    config.validate()?;

    match config.mode {
        Mode::InMemory => Ok(in_memory(index, config)),
        Mode::Iterative => {
            let store = CsvSnapshotStore::new(work_dir, index)?;
            let result = iterative(index, config, store);
            // Round files are gone either way; drop the directory too if nothing else lives there
            if std::fs::remove_dir(work_dir).is_err() {
                log::debug!("Left snapshot directory {} in place", work_dir.display());
            }
            result
        }
    }
}

fn in_memory<A: Adjacency>(adjacency: &A, config: &Config) -> ClusterSet {
    let core = find_core_clusters(adjacency);
    DuplicationEngine::new(config.duplication_threshold_ratio).apply(adjacency, core)
}

fn iterative<A: Adjacency, S: SnapshotStore>(
    adjacency: &A,
    config: &Config,
    store: S,
) -> Result<ClusterSet> {
    let snapshot = LabelPropagation::new(adjacency, store, config.num_iterations)
        .stop_when_stable(config.stop_when_stable)
        .run()?;

    let core = clusters_from_snapshot(adjacency, &snapshot);
    Ok(DuplicationEngine::new(config.duplication_threshold_ratio).apply(adjacency, core))
}
