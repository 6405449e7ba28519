//! Parquet interaction tables

use crate::data::{LoadStats, LoadedInput};
use crate::error::{ClusterError, Result};
use crate::graph::InteractionIndexBuilder;
use polars::prelude::*;
use std::path::Path;

/// Load interactions from two string columns of a Parquet file
pub fn load_parquet(path: &Path, a_column: &str, b_column: &str) -> Result<LoadedInput> {
    log::info!("Reading parquet file: {}", path.display());

    if !path.exists() {
        return Err(ClusterError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = LazyFrame::scan_parquet(path, Default::default())?
        .select([col(a_column), col(b_column)])
        .collect()?;

    log::info!("File schema: {:?}", df.schema());

    let a_col = df.column(a_column)?.str()?;
    let b_col = df.column(b_column)?.str()?;

    let row_count = df.height();
    let mut builder = InteractionIndexBuilder::with_capacity(row_count);
    let mut stats = LoadStats::default();

    for i in 0..row_count {
        match (a_col.get(i), b_col.get(i)) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
                builder.add_interaction(a, b);
                stats.records += 1;
            }
            _ => {
                log::warn!("Skipping row {}: missing {} or {}", i, a_column, b_column);
                stats.skipped += 1;
            }
        }
    }

    log::info!(
        "Loaded {} interaction rows ({} malformed skipped)",
        stats.records,
        stats.skipped
    );

    Ok(LoadedInput {
        index: builder.build(),
        stats,
    })
}
