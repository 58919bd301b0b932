pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod store;

use chrono::Utc;
use models::{
    advice::AdviceResult,
    portfolio::Portfolio,
    position::Position,
    quote::QuoteCache,
    settings::Settings,
    summary::PortfolioSummary,
    thresholds::ThresholdParameters,
};
use providers::registry::ProviderRegistry;
use services::{
    advice_service::AdviceEvaluator, portfolio_service::PortfolioService,
    quote_service::QuoteService, summary_service::SummaryService,
};
use store::traits::{HoldingsStore, VersionToken};

use errors::CoreError;

/// Main entry point for the Stock Sentry core library.
///
/// Holds one session's state: the holdings document loaded from the remote
/// store plus its version token, the quote cache, and the services that
/// operate on them. A frontend drives one render cycle as:
/// `refresh_quotes()` → `dashboard()` → (optional edits) → `sync()`.
#[must_use]
pub struct StockSentry {
    store: Box<dyn HoldingsStore>,
    portfolio: Portfolio,
    token: VersionToken,
    settings: Settings,
    quote_cache: QuoteCache,
    quote_service: QuoteService,
    portfolio_service: PortfolioService,
    summary_service: SummaryService,
    advice_evaluator: AdviceEvaluator,
    /// Tracks whether any edit has occurred since the last load/sync.
    dirty: bool,
}

impl std::fmt::Debug for StockSentry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockSentry")
            .field("store", &self.store.name())
            .field("positions", &self.portfolio.len())
            .field("token", &self.token)
            .field("cached_quotes", &self.quote_cache.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl StockSentry {
    /// Connect to a holdings store and load the current document.
    ///
    /// Fails with `NotFound` when the document has not been provisioned yet,
    /// or a transport error when the store is unreachable.
    pub async fn connect(store: Box<dyn HoldingsStore>) -> Result<Self, CoreError> {
        Self::connect_with_settings(store, Settings::default()).await
    }

    /// Connect with explicit settings (thresholds, provider API keys).
    pub async fn connect_with_settings(
        store: Box<dyn HoldingsStore>,
        settings: Settings,
    ) -> Result<Self, CoreError> {
        let (portfolio, token) = store.load().await?;
        let registry = ProviderRegistry::new_with_defaults(&settings.api_keys);

        Ok(Self {
            store,
            portfolio,
            token,
            settings,
            quote_cache: QuoteCache::new(),
            quote_service: QuoteService::new(registry),
            portfolio_service: PortfolioService::new(),
            summary_service: SummaryService::new(),
            advice_evaluator: AdviceEvaluator::new(),
            dirty: false,
        })
    }

    /// Re-fetch the holdings document, discarding any unsynced local edits.
    pub async fn reload(&mut self) -> Result<(), CoreError> {
        let (portfolio, token) = self.store.load().await?;
        self.portfolio = portfolio;
        self.token = token;
        self.dirty = false;
        Ok(())
    }

    // ── Quotes ──────────────────────────────────────────────────────

    /// Refresh quotes for every held symbol, subject to the quote cache TTL.
    ///
    /// A failed symbol does not fail the cycle: its advice is simply not
    /// computable until a later refresh succeeds. Returns the per-symbol
    /// failures for inline display.
    pub async fn refresh_quotes(&mut self) -> Vec<(String, CoreError)> {
        let now = Utc::now();
        let mut failures = Vec::new();

        for symbol in self.portfolio.symbols() {
            if let Err(e) = self
                .quote_service
                .latest_close(&mut self.quote_cache, &symbol, now)
                .await
            {
                log::warn!("quote refresh failed for {symbol}: {e}");
                failures.push((symbol, e));
            }
        }

        failures
    }

    /// Fetch (or reuse) the latest close for a single symbol.
    pub async fn latest_close(&mut self, symbol: &str) -> Result<f64, CoreError> {
        self.quote_service
            .latest_close(&mut self.quote_cache, symbol, Utc::now())
            .await
    }

    /// Number of cached quote entries, fresh or stale.
    #[must_use]
    pub fn quote_cache_len(&self) -> usize {
        self.quote_cache.len()
    }

    /// Drop the cached quote for one symbol, forcing a re-fetch.
    pub fn invalidate_quote(&mut self, symbol: &str) -> bool {
        self.quote_cache.invalidate(symbol)
    }

    /// Drop all cached quotes.
    pub fn clear_quotes(&mut self) {
        self.quote_cache.clear();
    }

    /// Manually insert a quote into the cache (useful for testing or
    /// offline use). Subject to the same TTL as fetched quotes.
    pub fn set_cached_quote(&mut self, symbol: &str, price: f64) {
        self.quote_cache.insert(symbol, price, Utc::now());
    }

    // ── Dashboard ───────────────────────────────────────────────────

    /// Build the dashboard snapshot for this cycle from the current
    /// portfolio and whatever fresh quotes the cache holds.
    #[must_use]
    pub fn dashboard(&self) -> PortfolioSummary {
        self.summary_service.summarize(
            &self.portfolio,
            &self.quote_cache,
            Utc::now(),
            &self.settings.thresholds,
        )
    }

    /// Threshold advice for a single position.
    ///
    /// Requires a fresh quote in the cache; call `refresh_quotes()` (or
    /// `latest_close`) first. Fails with `QuoteUnavailable` otherwise.
    pub fn advice_for(&self, symbol: &str) -> Result<AdviceResult, CoreError> {
        let position = self
            .portfolio
            .get(symbol)
            .ok_or_else(|| CoreError::PositionNotFound(symbol.to_string()))?;

        let quote = self
            .quote_cache
            .get_fresh(symbol, Utc::now())
            .ok_or_else(|| CoreError::QuoteUnavailable(symbol.to_string()))?;

        self.advice_evaluator.evaluate(
            quote.price,
            position.cost_basis,
            position.shares,
            self.portfolio.cash,
            &self.settings.thresholds,
        )
    }

    // ── Holdings Edits ──────────────────────────────────────────────

    /// Set the free cash balance. Rejected edits leave prior state intact.
    pub fn set_cash(&mut self, cash: f64) -> Result<(), CoreError> {
        self.portfolio_service.set_cash(&mut self.portfolio, cash)?;
        self.dirty = true;
        Ok(())
    }

    /// Add a position or overwrite an existing one.
    pub fn upsert_position(
        &mut self,
        symbol: &str,
        name: &str,
        shares: f64,
        cost_basis: f64,
    ) -> Result<(), CoreError> {
        self.portfolio_service
            .upsert_position(&mut self.portfolio, symbol, name, shares, cost_basis)?;
        self.dirty = true;
        Ok(())
    }

    /// Remove a position by symbol. Returns the removed position.
    pub fn remove_position(&mut self, symbol: &str) -> Result<Position, CoreError> {
        let removed = self
            .portfolio_service
            .remove_position(&mut self.portfolio, symbol)?;
        self.dirty = true;
        Ok(removed)
    }

    // ── Sync ────────────────────────────────────────────────────────

    /// Write the holdings document back to the store, guarded by the session
    /// version token.
    ///
    /// On success the store's replacement token is adopted and the
    /// unsaved-changes flag clears. On `Conflict` (the document changed
    /// upstream), the remote state is reloaded (discarding local edits) and
    /// the conflict is surfaced so the user can redo the edit against current
    /// data. Transport errors leave local state untouched for a later retry.
    pub async fn sync(&mut self) -> Result<VersionToken, CoreError> {
        match self.store.save(&self.portfolio, &self.token).await {
            Ok(new_token) => {
                self.token = new_token.clone();
                self.dirty = false;
                Ok(new_token)
            }
            Err(CoreError::Conflict(msg)) => {
                if let Err(reload_err) = self.reload().await {
                    log::warn!("reload after conflict failed: {reload_err}");
                }
                Err(CoreError::Conflict(msg))
            }
            Err(e) => Err(e),
        }
    }

    /// Returns `true` if the portfolio has been edited since the last
    /// load/sync.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Replace the strategy thresholds for subsequent evaluations.
    pub fn set_thresholds(&mut self, thresholds: ThresholdParameters) {
        self.settings.thresholds = thresholds;
    }

    /// Set an API key for a provider (e.g., "alphavantage").
    /// Rebuilds the provider registry so the new key takes effect immediately.
    pub fn set_api_key(&mut self, provider: String, key: String) {
        self.settings.api_keys.insert(provider, key);
        let registry = ProviderRegistry::new_with_defaults(&self.settings.api_keys);
        self.quote_service = QuoteService::new(registry);
    }

    /// Remove an API key for a provider.
    /// Rebuilds the provider registry so the removal takes effect immediately.
    pub fn remove_api_key(&mut self, provider: &str) -> bool {
        let removed = self.settings.api_keys.remove(provider).is_some();
        if removed {
            let registry = ProviderRegistry::new_with_defaults(&self.settings.api_keys);
            self.quote_service = QuoteService::new(registry);
        }
        removed
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The version token of the currently loaded document revision.
    #[must_use]
    pub fn version_token(&self) -> &VersionToken {
        &self.token
    }
}
