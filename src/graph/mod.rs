//! Bipartite interaction graph representation

pub mod builder;
pub mod entity;
pub mod index;

pub use builder::InteractionIndexBuilder;
pub use entity::{EntityKey, NodeId, Side};
pub use index::{Adjacency, InteractionIndex};
