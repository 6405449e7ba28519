//! Entity identifiers for the two sides of the interaction graph

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side of the bipartite graph an entity lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

/// Dense handle of an entity inside an [`InteractionIndex`](super::InteractionIndex).
///
/// Handles follow canonical order (side A first, then id ascending), so
/// comparing two handles compares the entities they name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

/// Side-qualified entity identifier, written as `A:<id>` or `B:<id>`.
///
/// The same raw id may occur on both sides, so persisted state always
/// carries the side along with the id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    pub side: Side,
    pub id: String,
}

impl EntityKey {
    pub fn new(side: Side, id: impl Into<String>) -> Self {
        Self {
            side,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.side, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEntityKeyError(pub String);

impl fmt::Display for ParseEntityKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid entity key '{}'", self.0)
    }
}

impl std::error::Error for ParseEntityKeyError {}

impl FromStr for EntityKey {
    type Err = ParseEntityKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, id) = s
            .split_once(':')
            .ok_or_else(|| ParseEntityKeyError(s.to_string()))?;
        let side = match side {
            "A" => Side::A,
            "B" => Side::B,
            _ => return Err(ParseEntityKeyError(s.to_string())),
        };
        if id.is_empty() {
            return Err(ParseEntityKeyError(s.to_string()));
        }
        Ok(EntityKey::new(side, id))
    }
}
