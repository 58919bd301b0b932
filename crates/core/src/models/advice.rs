use serde::{Deserialize, Serialize};

/// The advice category for a single position, one render cycle at a time.
///
/// Produced by an ordered guard sequence: the variants are mutually
/// exclusive even where the numeric bands overlap at their boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdviceCategory {
    /// Drawdown breached the stop-loss floor: liquidate the full position
    CriticalStopLoss,
    /// Drawdown reached the accumulation trigger and cash allows buying
    Accumulate,
    /// Accumulation trigger met but the cash reserve floor forbids buying
    CashConstrained,
    /// Gain reached the profit-taking trigger
    TakeProfit,
    /// Normal fluctuation, no action
    Hold,
}

impl std::fmt::Display for AdviceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdviceCategory::CriticalStopLoss => write!(f, "CriticalStopLoss"),
            AdviceCategory::Accumulate => write!(f, "Accumulate"),
            AdviceCategory::CashConstrained => write!(f, "CashConstrained"),
            AdviceCategory::TakeProfit => write!(f, "TakeProfit"),
            AdviceCategory::Hold => write!(f, "Hold"),
        }
    }
}

/// Standing reference price levels, shown alongside the advice regardless of
/// which guard fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLevels {
    /// cost_basis × (1 − stop_loss)
    pub stop_loss_price: f64,

    /// cost_basis × (1 − buy_tier1)
    pub tier1_buy_price: f64,

    /// cost_basis × (1 + sell_trigger)
    pub sell_trigger_price: f64,

    /// total_assets × cash_reserve_fraction, the minimum cash floor
    pub reserve_line: f64,
}

/// Full evaluator output for one position. Recomputed every cycle,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceResult {
    /// Which guard fired
    pub category: AdviceCategory,

    /// Human-readable instruction for the dashboard
    pub message: String,

    /// (price − cost_basis) / cost_basis
    pub profit_ratio: f64,

    /// price × shares
    pub market_value: f64,

    /// cash + market_value
    pub total_assets: f64,

    /// market_value / total_assets, clamped to [0, 1]; 0 when total_assets is 0
    pub position_fraction: f64,

    /// Standing reference levels for the display table
    pub levels: ReferenceLevels,
}
