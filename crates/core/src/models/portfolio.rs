use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::position::Position;

/// The main data container. Everything in here gets serialized into the
/// remote holdings document and overwritten wholesale on each sync.
///
/// Contains: free cash and the positions, keyed by ticker symbol. The map
/// enforces symbol uniqueness and keeps iteration (and therefore the
/// persisted field order) deterministic, so version-control diffs of the
/// document stay clean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Free cash balance, non-negative
    pub cash: f64,

    /// Held positions keyed by ticker symbol
    pub positions: BTreeMap<String, Position>,
}

impl Portfolio {
    pub fn new(cash: f64) -> Self {
        Self {
            cash,
            positions: BTreeMap::new(),
        }
    }

    /// Symbols of all held positions, in stable (sorted) order.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        self.positions.keys().cloned().collect()
    }

    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::new(0.0)
    }
}
