use chrono::{DateTime, Utc};

use crate::models::portfolio::Portfolio;
use crate::models::quote::QuoteCache;
use crate::models::summary::{PortfolioSummary, PositionSummary};
use crate::models::thresholds::ThresholdParameters;
use crate::services::advice_service::AdviceEvaluator;

/// Computes the per-cycle dashboard snapshot: totals, P/L, allocation,
/// and threshold advice per position.
///
/// Never fails: a position without a fresh quote still appears in the
/// summary, it just carries no quote-derived fields and no advice for this
/// cycle. The next cycle retries.
pub struct SummaryService {
    evaluator: AdviceEvaluator,
}

impl SummaryService {
    pub fn new() -> Self {
        Self {
            evaluator: AdviceEvaluator::new(),
        }
    }

    /// Build the dashboard snapshot from the portfolio and whatever fresh
    /// quotes the cache holds at `now`.
    pub fn summarize(
        &self,
        portfolio: &Portfolio,
        quotes: &QuoteCache,
        now: DateTime<Utc>,
        thresholds: &ThresholdParameters,
    ) -> PortfolioSummary {
        // 1. Market value across positions with a fresh quote
        let mut market_value = 0.0;
        for (symbol, position) in &portfolio.positions {
            if let Some(quote) = quotes.get_fresh(symbol, now) {
                market_value += position.market_value(quote.price);
            }
        }
        let total_assets = portfolio.cash + market_value;

        // 2. Per-position breakdown
        let mut positions = Vec::with_capacity(portfolio.positions.len());
        for (symbol, position) in &portfolio.positions {
            let price = quotes.get_fresh(symbol, now).map(|q| q.price);

            let (mv, pl_amount, pl_ratio, advice) = match price {
                Some(p) => {
                    let advice = match self.evaluator.evaluate(
                        p,
                        position.cost_basis,
                        position.shares,
                        portfolio.cash,
                        thresholds,
                    ) {
                        Ok(a) => Some(a),
                        Err(e) => {
                            log::warn!("advice skipped for {symbol}: {e}");
                            None
                        }
                    };
                    (
                        Some(position.market_value(p)),
                        Some(position.unrealized_pl(p)),
                        Some((p - position.cost_basis) / position.cost_basis),
                        advice,
                    )
                }
                None => (None, None, None, None),
            };

            let allocation_pct = match (mv, total_assets > 0.0) {
                (Some(v), true) => (v / total_assets) * 100.0,
                _ => 0.0,
            };

            positions.push(PositionSummary {
                symbol: symbol.clone(),
                name: position.name.clone(),
                shares: position.shares,
                cost_basis: position.cost_basis,
                price,
                market_value: mv,
                pl_amount,
                pl_ratio,
                allocation_pct,
                advice,
            });
        }

        // Sort by allocation (largest first)
        positions.sort_by(|a, b| {
            b.allocation_pct
                .partial_cmp(&a.allocation_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        PortfolioSummary {
            as_of: now,
            cash: portfolio.cash,
            market_value,
            total_assets,
            positions,
        }
    }
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::new()
    }
}
