//! Whitespace-separated interaction records, one `<A-id> <B-id>` per line

use crate::data::{LoadStats, LoadedInput};
use crate::error::{ClusterError, Result};
use crate::graph::InteractionIndexBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Feed one raw line into the builder, skipping malformed records
fn ingest_line(
    builder: &mut InteractionIndexBuilder,
    stats: &mut LoadStats,
    line_number: usize,
    raw: &[u8],
) {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line,
        Err(_) => {
            log::warn!("Skipping line {}: not valid UTF-8", line_number);
            stats.skipped += 1;
            return;
        }
    };

    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (None, _, _) => {}
        (Some(a), Some(b), None) => {
            builder.add_interaction(a, b);
            stats.records += 1;
        }
        _ => {
            log::warn!(
                "Skipping line {}: expected 2 fields, got {}",
                line_number,
                line.split_whitespace().count()
            );
            stats.skipped += 1;
        }
    }
}

/// Parse interactions held in memory
pub fn parse_interactions(text: &str) -> Result<LoadedInput> {
    read_interactions(text.as_bytes())
}

/// Parse interactions from a buffered stream
pub fn read_interactions<R: BufRead>(reader: R) -> Result<LoadedInput> {
    let mut builder = InteractionIndexBuilder::default();
    let mut stats = LoadStats::default();

    for (i, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        ingest_line(&mut builder, &mut stats, i + 1, &line);
    }

    Ok(LoadedInput {
        index: builder.build(),
        stats,
    })
}

/// Load a text interaction file
pub fn load_text(path: &Path) -> Result<LoadedInput> {
    log::info!("Reading interaction file: {}", path.display());

    if !path.exists() {
        return Err(ClusterError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let loaded = read_interactions(BufReader::new(File::open(path)?))?;

    if loaded.stats.records == 0 && loaded.stats.skipped == 0 {
        log::warn!("Input file {} holds no interactions", path.display());
    }
    log::info!(
        "Loaded {} interaction records ({} malformed skipped)",
        loaded.stats.records,
        loaded.stats.skipped
    );

    Ok(loaded)
}
