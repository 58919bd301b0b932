use serde::{Deserialize, Serialize};

/// Immutable strategy configuration driving the advice evaluator.
///
/// All fields are fractions of the cost basis (or of total assets for
/// `cash_reserve_fraction`). Any finite values are accepted; degenerate
/// thresholds simply change which guard fires.
///
/// `buy_tier2` and `pullback` are read into configuration but not consulted
/// by any decision guard. They round-trip through settings and serialization
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdParameters {
    /// First drawdown fraction at which adding to the position is suggested
    pub buy_tier1: f64,

    /// Second accumulation tier, accepted but currently unused
    pub buy_tier2: f64,

    /// Drawdown fraction triggering full-liquidation guidance
    pub stop_loss: f64,

    /// Gain fraction triggering profit-taking guidance
    pub sell_trigger: f64,

    /// Reserved trailing-pullback fraction, accepted but currently unused
    pub pullback: f64,

    /// Minimum fraction of total assets that must remain as cash
    /// before further buying is permitted
    pub cash_reserve_fraction: f64,
}

impl Default for ThresholdParameters {
    fn default() -> Self {
        Self {
            buy_tier1: 0.06,
            buy_tier2: 0.12,
            stop_loss: 0.25,
            sell_trigger: 0.09,
            pullback: 0.025,
            cash_reserve_fraction: 0.10,
        }
    }
}
