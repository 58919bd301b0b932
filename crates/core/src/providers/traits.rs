use async_trait::async_trait;

use crate::errors::CoreError;

/// Trait abstraction for market-data providers.
///
/// The dashboard consumes exactly one operation: the most recent
/// trading-session closing price for a ticker. If a provider stops working
/// or changes its API, we replace only that one implementation; the rest
/// of the codebase is untouched.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Get the most recent closing price for a ticker symbol.
    ///
    /// Fails with `Api`/`Network` on provider or transport trouble, including
    /// an empty result for a holiday or an unknown symbol.
    async fn latest_close(&self, symbol: &str) -> Result<f64, CoreError>;
}
