//! Persistence of label propagation snapshots between rounds

use crate::cluster::propagation::Snapshot;
use crate::error::{ClusterError, Result};
use crate::graph::{EntityKey, InteractionIndex, NodeId};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Backing store for per-round assignment snapshots.
///
/// The propagation engine carries no state between rounds other than what
/// it saves here, so swapping the implementation moves the working set out
/// of memory without touching the algorithm.
pub trait SnapshotStore {
    /// Persist the snapshot produced by `round`
    fn save(&mut self, round: usize, snapshot: &Snapshot) -> Result<()>;

    /// Read back the snapshot of `round`
    fn load(&mut self, round: usize) -> Result<Snapshot>;

    /// Forget `round`; discarding an absent round is not an error
    fn discard(&mut self, round: usize) -> Result<()>;
}

/// Keeps snapshots in process memory
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    rounds: HashMap<usize, Snapshot>,
}

impl MemorySnapshotStore {
    /// Number of rounds currently held
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&mut self, round: usize, snapshot: &Snapshot) -> Result<()> {
        self.rounds.insert(round, snapshot.clone());
        Ok(())
    }

    fn load(&mut self, round: usize) -> Result<Snapshot> {
        self.rounds
            .get(&round)
            .cloned()
            .ok_or(ClusterError::MissingSnapshot { round })
    }

    fn discard(&mut self, round: usize) -> Result<()> {
        self.rounds.remove(&round);
        Ok(())
    }
}

/// One headerless CSV file per round, records `<entity-key>,<label-key>`.
///
/// Both columns are side-qualified keys such as `A:C1,B:M1` rather than raw
/// ids, since the same raw id may name one entity on each side.
pub struct CsvSnapshotStore<'a> {
    dir: PathBuf,
    index: &'a InteractionIndex,
}

impl<'a> CsvSnapshotStore<'a> {
    /// Use `dir` for round files, creating it when missing
    pub fn new(dir: impl Into<PathBuf>, index: &'a InteractionIndex) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, index })
    }

    pub fn path_for(&self, round: usize) -> PathBuf {
        self.dir.join(format!("entity_cluster_id_{}.csv", round))
    }

    fn resolve(&self, path: &Path, line: u64, field: &str) -> Result<NodeId> {
        let malformed = |reason: String| ClusterError::MalformedSnapshot {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let key: EntityKey = field.parse().map_err(|e| malformed(format!("{}", e)))?;
        self.index
            .lookup_key(&key)
            .ok_or_else(|| malformed(format!("unknown entity {}", key)))
    }
}

impl SnapshotStore for CsvSnapshotStore<'_> {
    fn save(&mut self, round: usize, snapshot: &Snapshot) -> Result<()> {
        let path = self.path_for(round);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;

        for (node, label) in snapshot.iter() {
            writer.write_record([
                self.index.key(node).to_string(),
                self.index.key(label).to_string(),
            ])?;
        }
        writer.flush()?;

        log::debug!("Wrote {} assignments to {}", snapshot.len(), path.display());
        Ok(())
    }

    fn load(&mut self, round: usize) -> Result<Snapshot> {
        let path = self.path_for(round);
        if !path.exists() {
            return Err(ClusterError::MissingSnapshot { round });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;

        let mut snapshot = Snapshot::empty(self.index.node_count());
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |pos| pos.line());
            if record.len() != 2 {
                return Err(ClusterError::MalformedSnapshot {
                    path: path.clone(),
                    line,
                    reason: format!("expected 2 fields, got {}", record.len()),
                });
            }

            let node = self.resolve(&path, line, &record[0])?;
            let label = self.resolve(&path, line, &record[1])?;
            snapshot.set(node, label);
        }

        Ok(snapshot)
    }

    fn discard(&mut self, round: usize) -> Result<()> {
        match fs::remove_file(self.path_for(round)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Side;

    #[test]
    fn memory_store_round_trip_and_discard() {
        let mut store = MemorySnapshotStore::default();
        let snapshot = Snapshot::initial(3);
        store.save(0, &snapshot).unwrap();
        assert_eq!(store.load(0).unwrap(), snapshot);

        store.discard(0).unwrap();
        store.discard(0).unwrap();
        assert!(matches!(
            store.load(0),
            Err(ClusterError::MissingSnapshot { round: 0 })
        ));
    }

    #[test]
    fn csv_store_writes_qualified_keys() {
        let dir = tempfile::tempdir().unwrap();
        let index = InteractionIndex::from_interactions([("X", "X"), ("C1", "X")]);
        let mut store = CsvSnapshotStore::new(dir.path(), &index).unwrap();

        let a_x = index.lookup(Side::A, "X").unwrap();
        let b_x = index.lookup(Side::B, "X").unwrap();
        let mut snapshot = Snapshot::empty(index.node_count());
        snapshot.set(a_x, b_x);
        snapshot.set(b_x, b_x);

        store.save(2, &snapshot).unwrap();
        let written = fs::read_to_string(store.path_for(2)).unwrap();
        assert_eq!(written, "A:X,B:X\nB:X,B:X\n");

        assert_eq!(store.load(2).unwrap(), snapshot);
        store.discard(2).unwrap();
        assert!(!store.path_for(2).exists());
    }

    #[test]
    fn csv_store_rejects_unknown_entity() {
        let dir = tempfile::tempdir().unwrap();
        let index = InteractionIndex::from_interactions([("C1", "M1")]);
        let mut store = CsvSnapshotStore::new(dir.path(), &index).unwrap();
        fs::write(store.path_for(0), "A:C1,A:C1\nA:C7,A:C1\n").unwrap();

        match store.load(0) {
            Err(ClusterError::MalformedSnapshot { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
