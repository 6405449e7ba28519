//! Interaction input loading

pub mod parquet;
pub mod text;

use crate::error::Result;
use crate::graph::InteractionIndex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use self::parquet::load_parquet;
pub use self::text::{load_text, parse_interactions, read_interactions};

/// Supported input encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    #[default]
    Text,
    Parquet,
}

/// Counts of accepted and rejected input records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub records: usize,
    pub skipped: usize,
}

/// An index together with the statistics of the load that produced it
#[derive(Debug)]
pub struct LoadedInput {
    pub index: InteractionIndex,
    pub stats: LoadStats,
}

/// Load interactions in the given format. Column names apply to Parquet only.
pub fn load_interactions(
    path: &Path,
    format: InputFormat,
    a_column: &str,
    b_column: &str,
) -> Result<LoadedInput> {
    match format {
        InputFormat::Text => load_text(path),
        InputFormat::Parquet => load_parquet(path, a_column, b_column),
    }
}
