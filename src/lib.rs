//! Bipartite interaction clustering with controlled duplication

pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod report;
pub mod storage;

pub use cluster::{Cluster, ClusterId, ClusterSet};
pub use config::{Config, Mode};
pub use error::{ClusterError, Result};
pub use graph::{Adjacency, EntityKey, InteractionIndex, NodeId, Side};
