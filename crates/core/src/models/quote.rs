use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How long a fetched quote stays fresh before it must be re-fetched.
pub const QUOTE_TTL_SECS: i64 = 30;

/// A single fetched quote: the most recent trading-session closing price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Ticker symbol this quote belongs to
    pub symbol: String,

    /// Most recent close, always positive
    pub price: f64,

    /// When the quote was fetched; freshness is measured from here
    pub fetched_at: DateTime<Utc>,
}

impl PriceQuote {
    /// Whether this quote is still within its freshness window at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Session-scoped cache of recent quotes, keyed by symbol.
///
/// Bounds call volume to the market-data provider: a quote is reused until
/// its TTL expires, then re-fetched. The cache is an explicit object passed
/// into the quote service; lifecycle is "valid until TTL expiry or explicit
/// invalidation," with no hidden global state.
#[derive(Debug, Clone)]
pub struct QuoteCache {
    entries: HashMap<String, PriceQuote>,
    ttl: Duration,
}

impl QuoteCache {
    /// Cache with the default 30-second TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(QUOTE_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Get the cached quote for `symbol` if it is still fresh at `now`.
    /// A stale entry is treated as absent.
    #[must_use]
    pub fn get_fresh(&self, symbol: &str, now: DateTime<Utc>) -> Option<&PriceQuote> {
        self.entries
            .get(symbol)
            .filter(|q| q.is_fresh(now, self.ttl))
    }

    /// Insert or replace the quote for a symbol.
    pub fn insert(&mut self, symbol: impl Into<String>, price: f64, fetched_at: DateTime<Utc>) {
        let symbol = symbol.into();
        self.entries.insert(
            symbol.clone(),
            PriceQuote {
                symbol,
                price,
                fetched_at,
            },
        );
    }

    /// Drop the cached quote for one symbol.
    pub fn invalidate(&mut self, symbol: &str) -> bool {
        self.entries.remove(symbol).is_some()
    }

    /// Drop all cached quotes.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}
