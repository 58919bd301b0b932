use chrono::{DateTime, Utc};

use crate::errors::CoreError;
use crate::models::quote::QuoteCache;
use crate::providers::registry::ProviderRegistry;

/// Fetches latest closing prices with TTL caching and provider fallback.
///
/// Cache strategy: a quote fetched within the TTL window (30 s by default)
/// is reused; after expiry the next lookup re-fetches. This bounds call
/// volume to the providers for a dashboard that re-renders every cycle.
///
/// **Note on precision**: prices are `f64`, ~15-17 significant decimal
/// digits. Sufficient for display and threshold comparison.
pub struct QuoteService {
    registry: ProviderRegistry,
}

impl QuoteService {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Check if at least one provider is configured.
    pub fn has_provider(&self) -> bool {
        !self.registry.is_empty()
    }

    /// The names of all configured providers, in fallback priority order.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry
            .providers()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Get the most recent closing price for a symbol.
    ///
    /// 1. Fresh cache hit → return the cached price.
    /// 2. Miss or stale → fetch from providers → store with `fetched_at = now`.
    pub async fn latest_close(
        &self,
        cache: &mut QuoteCache,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<f64, CoreError> {
        if let Some(quote) = cache.get_fresh(symbol, now) {
            return Ok(quote.price);
        }

        let price = self.fetch_close(symbol).await?;
        cache.insert(symbol, price, now);
        Ok(price)
    }

    /// Internal: fetch a single close from providers with automatic fallback.
    ///
    /// Tries providers in registration order. If the primary fails (API down,
    /// rate limited, holiday gap), falls back to the next provider.
    /// Validates that returned prices are finite and positive.
    async fn fetch_close(&self, symbol: &str) -> Result<f64, CoreError> {
        let providers = self.registry.providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;

        for provider in &providers {
            match provider.latest_close(symbol).await {
                Ok(price) => {
                    if !price.is_finite() || price <= 0.0 {
                        last_error = Some(CoreError::Api {
                            provider: provider.name().to_string(),
                            message: format!(
                                "Invalid price returned for {symbol}: {price} (must be finite and positive)"
                            ),
                        });
                        continue;
                    }
                    return Ok(price);
                }
                Err(e) => {
                    log::warn!(
                        "quote provider {} failed for {symbol}: {e}",
                        provider.name()
                    );
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }
}
