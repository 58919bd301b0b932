use crate::errors::CoreError;
use crate::models::advice::{AdviceCategory, AdviceResult, ReferenceLevels};
use crate::models::thresholds::ThresholdParameters;

/// Evaluates one position against the fixed strategy thresholds.
///
/// Pure business logic — no I/O, no hidden state. Calling `evaluate` twice
/// with identical inputs yields identical output.
pub struct AdviceEvaluator;

impl AdviceEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Map (price, cost basis, shares, cash) to a decision for this cycle.
    ///
    /// The guards are evaluated in order and the first match wins. The
    /// ordering is a contract, not an implementation detail: the bands can
    /// overlap numerically at the boundaries, and the stop-loss guard must
    /// dominate the accumulation guards regardless of cash position.
    ///
    /// Derived quantities and the reference levels are computed up front and
    /// returned on every branch, so the dashboard can render its standing
    /// reference table next to whichever advice fired.
    ///
    /// Fails with `ValidationError` on bad numeric input (`price ≤ 0`,
    /// `cost_basis ≤ 0`, `shares < 0`, `cash < 0`, or anything non-finite).
    /// Threshold values are never validated: any finite thresholds, including
    /// degenerate zero/negative ones, simply change which guard fires.
    pub fn evaluate(
        &self,
        price: f64,
        cost_basis: f64,
        shares: f64,
        cash: f64,
        thresholds: &ThresholdParameters,
    ) -> Result<AdviceResult, CoreError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "price must be positive and finite, got {price}"
            )));
        }
        if !cost_basis.is_finite() || cost_basis <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "cost basis must be positive and finite, got {cost_basis}"
            )));
        }
        if !shares.is_finite() || shares < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "shares must be non-negative and finite, got {shares}"
            )));
        }
        if !cash.is_finite() || cash < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "cash must be non-negative and finite, got {cash}"
            )));
        }

        let profit_ratio = (price - cost_basis) / cost_basis;
        let market_value = price * shares;
        let total_assets = cash + market_value;
        let reserve_line = total_assets * thresholds.cash_reserve_fraction;
        let position_fraction = if total_assets > 0.0 {
            (market_value / total_assets).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let levels = ReferenceLevels {
            stop_loss_price: cost_basis * (1.0 - thresholds.stop_loss),
            tier1_buy_price: cost_basis * (1.0 - thresholds.buy_tier1),
            sell_trigger_price: cost_basis * (1.0 + thresholds.sell_trigger),
            reserve_line,
        };

        // First match wins. `buy_tier2` and `pullback` take no part in
        // any guard.
        let (category, message) = if profit_ratio <= -thresholds.stop_loss {
            (
                AdviceCategory::CriticalStopLoss,
                "Stop-loss breached: liquidate the full position to protect capital.".to_string(),
            )
        } else if profit_ratio <= -thresholds.buy_tier1 {
            if cash > reserve_line {
                (
                    AdviceCategory::Accumulate,
                    format!(
                        "Drawdown of {:.1}% reached the tier-1 buy trigger: consider adding to the position.",
                        -profit_ratio * 100.0
                    ),
                )
            } else {
                (
                    AdviceCategory::CashConstrained,
                    "Accumulation trigger met, but the cash reserve floor forbids further buying."
                        .to_string(),
                )
            }
        } else if profit_ratio >= thresholds.sell_trigger {
            (
                AdviceCategory::TakeProfit,
                format!(
                    "Take-profit target {:.2} reached.",
                    levels.sell_trigger_price
                ),
            )
        } else {
            (
                AdviceCategory::Hold,
                "Normal fluctuation: hold and wait.".to_string(),
            )
        };

        Ok(AdviceResult {
            category,
            message,
            profit_ratio,
            market_value,
            total_assets,
            position_fraction,
            levels,
        })
    }
}

impl Default for AdviceEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
