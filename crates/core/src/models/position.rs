use serde::{Deserialize, Serialize};

/// One holding in the portfolio.
///
/// Created when the user adds it to the holdings document, updated in place
/// by explicit edits, never mutated automatically by price movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Exchange ticker, unique key within a portfolio (e.g., "603679.SS", "AAPL")
    pub symbol: String,

    /// Human-readable display name (cosmetic)
    pub name: String,

    /// Number of shares held. Non-negative; zero means a watched-but-flat position.
    pub shares: f64,

    /// Average acquisition price per share. Always positive.
    pub cost_basis: f64,
}

impl Position {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        shares: f64,
        cost_basis: f64,
    ) -> Self {
        Self {
            symbol: symbol.into().trim().to_string(),
            name: name.into(),
            shares,
            cost_basis,
        }
    }

    /// Market value of this position at the given price.
    #[must_use]
    pub fn market_value(&self, price: f64) -> f64 {
        price * self.shares
    }

    /// Unrealized profit/loss amount at the given price.
    #[must_use]
    pub fn unrealized_pl(&self, price: f64) -> f64 {
        (price - self.cost_basis) * self.shares
    }
}
