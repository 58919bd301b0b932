use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;
use crate::models::position::Position;

/// Manages holdings edits: cash, share counts, cost basis.
///
/// Pure business logic — no I/O. Every edit is validated first; a rejected
/// edit leaves the portfolio exactly as it was.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Set the free cash balance.
    pub fn set_cash(&self, portfolio: &mut Portfolio, cash: f64) -> Result<(), CoreError> {
        if !cash.is_finite() || cash < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "cash must be non-negative and finite, got {cash}"
            )));
        }
        portfolio.cash = cash;
        Ok(())
    }

    /// Insert a new position or overwrite an existing one.
    ///
    /// Rules:
    /// - symbol must be non-empty after trimming
    /// - shares must be non-negative and finite
    /// - cost basis must be positive and finite
    pub fn upsert_position(
        &self,
        portfolio: &mut Portfolio,
        symbol: &str,
        name: &str,
        shares: f64,
        cost_basis: f64,
    ) -> Result<(), CoreError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(CoreError::ValidationError(
                "symbol must not be empty".into(),
            ));
        }
        if !shares.is_finite() || shares < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "shares must be non-negative and finite, got {shares}"
            )));
        }
        if !cost_basis.is_finite() || cost_basis <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "cost basis must be positive and finite, got {cost_basis}"
            )));
        }

        portfolio.positions.insert(
            symbol.to_string(),
            Position::new(symbol, name, shares, cost_basis),
        );
        Ok(())
    }

    /// Remove a position by symbol.
    pub fn remove_position(
        &self,
        portfolio: &mut Portfolio,
        symbol: &str,
    ) -> Result<Position, CoreError> {
        portfolio
            .positions
            .remove(symbol.trim())
            .ok_or_else(|| CoreError::PositionNotFound(symbol.to_string()))
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
