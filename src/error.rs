//! Error types for the interaction clustering library

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading interactions, persisting snapshots or
/// validating configuration
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Label propagation needs at least one round
    #[error("num_iterations must be at least 1, got {got}")]
    InvalidIterations { got: usize },

    /// Duplication threshold must lie in (0, 1]
    #[error("duplication_threshold_ratio must be in (0, 1], got {got}")]
    InvalidThreshold { got: f64 },

    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// A persisted snapshot could not be read back
    #[error("malformed snapshot record in {} at line {line}: {reason}", path.display())]
    MalformedSnapshot {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// A round was requested from a store that never saved it
    #[error("no snapshot stored for round {round}")]
    MissingSnapshot { round: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, ClusterError>;
