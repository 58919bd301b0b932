use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::advice::AdviceResult;

/// Dashboard snapshot of the whole portfolio for one render cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// When this summary was computed
    pub as_of: DateTime<Utc>,

    /// Free cash balance
    pub cash: f64,

    /// Sum of market values of all positions with a fresh quote
    pub market_value: f64,

    /// cash + market_value
    pub total_assets: f64,

    /// Per-position breakdown, sorted by allocation (largest first)
    pub positions: Vec<PositionSummary>,
}

/// Per-cycle view of a single position.
///
/// Quote-derived fields are `None` when no fresh quote was available this
/// cycle: the position still appears, but no advice is computable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSummary {
    pub symbol: String,
    pub name: String,
    pub shares: f64,
    pub cost_basis: f64,

    /// Most recent close, if a fresh quote was available
    pub price: Option<f64>,

    /// price × shares
    pub market_value: Option<f64>,

    /// (price − cost_basis) × shares
    pub pl_amount: Option<f64>,

    /// (price − cost_basis) / cost_basis
    pub pl_ratio: Option<f64>,

    /// This position's share of total assets, in percent
    pub allocation_pct: f64,

    /// Threshold advice for this cycle, absent without a fresh quote
    pub advice: Option<AdviceResult>,
}
