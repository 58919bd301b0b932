use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;
use crate::models::position::Position;

/// Wire format of the persisted holdings document.
///
/// Top-level shape, unchanged across deployments so existing documents keep
/// working:
///
/// ```json
/// {
///     "cash": 40000.0,
///     "stocks": {
///         "603679.SS": { "name": "Huati Tech", "shares": 2600.0, "cost": 16.384 }
///     }
/// }
/// ```
///
/// Field order is stable (struct declaration order + BTreeMap keys) so
/// successive commits of the document diff cleanly.
#[derive(Debug, Serialize, Deserialize)]
struct HoldingsDocument {
    cash: f64,
    stocks: BTreeMap<String, StockEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StockEntry {
    name: String,
    shares: f64,
    cost: f64,
}

/// Encode a portfolio into the pretty-printed document body.
pub fn encode(portfolio: &Portfolio) -> Result<String, CoreError> {
    let doc = HoldingsDocument {
        cash: portfolio.cash,
        stocks: portfolio
            .positions
            .iter()
            .map(|(symbol, p)| {
                (
                    symbol.clone(),
                    StockEntry {
                        name: p.name.clone(),
                        shares: p.shares,
                        cost: p.cost_basis,
                    },
                )
            })
            .collect(),
    };

    serde_json::to_string_pretty(&doc)
        .map_err(|e| CoreError::Serialization(format!("Failed to encode holdings document: {e}")))
}

/// Decode and validate a document body into a portfolio.
///
/// Rules:
/// - all numbers finite
/// - cash ≥ 0
/// - shares ≥ 0 and cost > 0 per stock
pub fn decode(body: &str) -> Result<Portfolio, CoreError> {
    let doc: HoldingsDocument = serde_json::from_str(body)
        .map_err(|e| CoreError::InvalidDocument(format!("Malformed holdings document: {e}")))?;

    if !doc.cash.is_finite() || doc.cash < 0.0 {
        return Err(CoreError::InvalidDocument(format!(
            "cash must be non-negative and finite, got {}",
            doc.cash
        )));
    }

    let mut portfolio = Portfolio::new(doc.cash);
    for (symbol, entry) in doc.stocks {
        let symbol = symbol.trim().to_string();
        if symbol.is_empty() {
            return Err(CoreError::InvalidDocument(
                "stock symbol must not be empty".into(),
            ));
        }
        if !entry.shares.is_finite() || entry.shares < 0.0 {
            return Err(CoreError::InvalidDocument(format!(
                "shares for {symbol} must be non-negative and finite, got {}",
                entry.shares
            )));
        }
        if !entry.cost.is_finite() || entry.cost <= 0.0 {
            return Err(CoreError::InvalidDocument(format!(
                "cost for {symbol} must be positive and finite, got {}",
                entry.cost
            )));
        }
        portfolio.positions.insert(
            symbol.clone(),
            Position::new(symbol, entry.name, entry.shares, entry.cost),
        );
    }

    Ok(portfolio)
}
