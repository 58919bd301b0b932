// ═══════════════════════════════════════════════════════════════════
// Store & Facade Tests — document codec, optimistic concurrency,
// StockSentry session flows
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use stock_sentry_core::errors::CoreError;
use stock_sentry_core::models::portfolio::Portfolio;
use stock_sentry_core::models::position::Position;
use stock_sentry_core::store::document;
use stock_sentry_core::store::traits::{HoldingsStore, VersionToken};
use stock_sentry_core::StockSentry;

fn sample_portfolio() -> Portfolio {
    let mut p = Portfolio::new(40_000.0);
    p.positions.insert(
        "603679.SS".into(),
        Position::new("603679.SS", "Huati Tech", 2600.0, 16.384),
    );
    p.positions
        .insert("AAPL".into(), Position::new("AAPL", "Apple", 100.0, 180.0));
    p
}

// ═══════════════════════════════════════════════════════════════════
// Mock Stores
// ═══════════════════════════════════════════════════════════════════

/// Shared in-memory store with version tokens "v1", "v2", ... and
/// conflict detection on stale tokens. Clones share state, so two
/// sessions can race against the same document.
#[derive(Clone)]
struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

struct MemoryInner {
    portfolio: Portfolio,
    rev: u64,
}

impl MemoryStore {
    fn seeded(portfolio: Portfolio) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner { portfolio, rev: 1 })),
        }
    }

    fn current(&self) -> (Portfolio, String) {
        let inner = self.inner.lock().unwrap();
        (inner.portfolio.clone(), format!("v{}", inner.rev))
    }
}

#[async_trait]
impl HoldingsStore for MemoryStore {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn load(&self) -> Result<(Portfolio, VersionToken), CoreError> {
        let inner = self.inner.lock().unwrap();
        Ok((
            inner.portfolio.clone(),
            VersionToken::new(format!("v{}", inner.rev)),
        ))
    }

    async fn save(
        &self,
        portfolio: &Portfolio,
        token: &VersionToken,
    ) -> Result<VersionToken, CoreError> {
        let mut inner = self.inner.lock().unwrap();
        let current = format!("v{}", inner.rev);
        if token.as_str() != current {
            return Err(CoreError::Conflict(format!(
                "token {token} is stale, current is {current}"
            )));
        }
        inner.portfolio = portfolio.clone();
        inner.rev += 1;
        Ok(VersionToken::new(format!("v{}", inner.rev)))
    }
}

/// A store whose document was never provisioned.
struct MissingStore;

#[async_trait]
impl HoldingsStore for MissingStore {
    fn name(&self) -> &str {
        "Missing"
    }

    async fn load(&self) -> Result<(Portfolio, VersionToken), CoreError> {
        Err(CoreError::NotFound("owner/repo/holdings.json".into()))
    }

    async fn save(
        &self,
        _portfolio: &Portfolio,
        _token: &VersionToken,
    ) -> Result<VersionToken, CoreError> {
        Err(CoreError::NotFound("owner/repo/holdings.json".into()))
    }
}

/// Loads fine, then drops the network on every save.
struct FlakyWriteStore {
    seed: Portfolio,
}

#[async_trait]
impl HoldingsStore for FlakyWriteStore {
    fn name(&self) -> &str {
        "FlakyWrite"
    }

    async fn load(&self) -> Result<(Portfolio, VersionToken), CoreError> {
        Ok((self.seed.clone(), VersionToken::new("v1")))
    }

    async fn save(
        &self,
        _portfolio: &Portfolio,
        _token: &VersionToken,
    ) -> Result<VersionToken, CoreError> {
        Err(CoreError::Network("connection reset by peer".into()))
    }
}

// ═══════════════════════════════════════════════════════════════════
// Document codec
// ═══════════════════════════════════════════════════════════════════

mod codec {
    use super::*;

    #[test]
    fn encode_uses_wire_field_names() {
        let body = document::encode(&sample_portfolio()).unwrap();
        assert!(body.contains("\"cash\""));
        assert!(body.contains("\"stocks\""));
        assert!(body.contains("\"name\""));
        assert!(body.contains("\"shares\""));
        assert!(body.contains("\"cost\""));
        // internal naming must not leak into the document
        assert!(!body.contains("cost_basis"));
        assert!(!body.contains("positions"));
    }

    #[test]
    fn encode_orders_symbols_deterministically() {
        let body = document::encode(&sample_portfolio()).unwrap();
        let aapl = body.find("\"AAPL\"").unwrap();
        let huati = body.find("\"603679.SS\"").unwrap();
        assert!(huati < aapl, "BTreeMap order: digits sort before letters");

        // cash leads the document for stable diffs
        assert!(body.find("\"cash\"").unwrap() < body.find("\"stocks\"").unwrap());
    }

    #[test]
    fn encode_is_stable_across_calls() {
        let p = sample_portfolio();
        assert_eq!(document::encode(&p).unwrap(), document::encode(&p).unwrap());
    }

    #[test]
    fn decode_reads_back_encoded_portfolio() {
        let p = sample_portfolio();
        let decoded = document::decode(&document::encode(&p).unwrap()).unwrap();
        assert_eq!(p, decoded);
    }

    #[test]
    fn decode_accepts_original_document_shape() {
        let body = r#"{
            "cash": 40000.0,
            "stocks": {
                "603679.SS": { "name": "Huati Tech", "shares": 2600, "cost": 16.384 }
            }
        }"#;
        let p = document::decode(body).unwrap();
        assert_eq!(p.cash, 40_000.0);
        assert_eq!(p.get("603679.SS").unwrap().shares, 2600.0);
        assert_eq!(p.get("603679.SS").unwrap().cost_basis, 16.384);
    }

    #[test]
    fn decode_rejects_malformed_json() {
        let err = document::decode("{not json").unwrap_err();
        assert!(matches!(err, CoreError::InvalidDocument(_)));
    }

    #[test]
    fn decode_rejects_negative_cash() {
        let body = r#"{ "cash": -1.0, "stocks": {} }"#;
        assert!(matches!(
            document::decode(body),
            Err(CoreError::InvalidDocument(_))
        ));
    }

    #[test]
    fn decode_rejects_negative_shares() {
        let body = r#"{ "cash": 0.0, "stocks": { "AAPL": { "name": "Apple", "shares": -1, "cost": 180.0 } } }"#;
        assert!(matches!(
            document::decode(body),
            Err(CoreError::InvalidDocument(_))
        ));
    }

    #[test]
    fn decode_rejects_zero_cost() {
        let body = r#"{ "cash": 0.0, "stocks": { "AAPL": { "name": "Apple", "shares": 1, "cost": 0.0 } } }"#;
        assert!(matches!(
            document::decode(body),
            Err(CoreError::InvalidDocument(_))
        ));
    }

    #[test]
    fn decode_rejects_empty_symbol() {
        let body = r#"{ "cash": 0.0, "stocks": { "  ": { "name": "x", "shares": 1, "cost": 1.0 } } }"#;
        assert!(matches!(
            document::decode(body),
            Err(CoreError::InvalidDocument(_))
        ));
    }

    #[test]
    fn decode_accepts_zero_shares() {
        let body = r#"{ "cash": 0.0, "stocks": { "AAPL": { "name": "Apple", "shares": 0, "cost": 180.0 } } }"#;
        assert!(document::decode(body).is_ok());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Optimistic concurrency (store contract)
// ═══════════════════════════════════════════════════════════════════

mod concurrency {
    use super::*;

    #[tokio::test]
    async fn save_with_current_token_replaces_it() {
        let store = MemoryStore::seeded(sample_portfolio());
        let (mut portfolio, token) = store.load().await.unwrap();

        portfolio.cash = 50_000.0;
        let new_token = store.save(&portfolio, &token).await.unwrap();
        assert_ne!(new_token, token);

        let (reloaded, reloaded_token) = store.load().await.unwrap();
        assert_eq!(reloaded.cash, 50_000.0);
        assert_eq!(reloaded_token, new_token);
    }

    #[tokio::test]
    async fn save_with_stale_token_conflicts_and_preserves_document() {
        let store = MemoryStore::seeded(sample_portfolio());
        let (mut a, stale) = store.load().await.unwrap();

        // someone else writes first
        let (mut b, current) = store.load().await.unwrap();
        b.cash = 99_000.0;
        store.save(&b, &current).await.unwrap();

        // our write with the old token must be rejected...
        a.cash = 11_000.0;
        let err = store.save(&a, &stale).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        // ...and the document keeps the winning revision
        assert_eq!(store.current().0.cash, 99_000.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// StockSentry facade
// ═══════════════════════════════════════════════════════════════════

mod facade {
    use super::*;

    #[tokio::test]
    async fn connect_loads_document_and_token() {
        let store = MemoryStore::seeded(sample_portfolio());
        let sentry = StockSentry::connect(Box::new(store)).await.unwrap();

        assert_eq!(sentry.portfolio().cash, 40_000.0);
        assert_eq!(sentry.portfolio().len(), 2);
        assert_eq!(sentry.version_token().as_str(), "v1");
        assert!(!sentry.has_unsaved_changes());
    }

    #[tokio::test]
    async fn connect_surfaces_missing_document() {
        let err = StockSentry::connect(Box::new(MissingStore)).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn edit_then_sync_persists_and_clears_dirty() {
        let store = MemoryStore::seeded(sample_portfolio());
        let remote = store.clone();
        let mut sentry = StockSentry::connect(Box::new(store)).await.unwrap();

        sentry.set_cash(52_000.0).unwrap();
        sentry.upsert_position("AAPL", "Apple", 120.0, 178.0).unwrap();
        assert!(sentry.has_unsaved_changes());

        let new_token = sentry.sync().await.unwrap();
        assert_eq!(new_token.as_str(), "v2");
        assert!(!sentry.has_unsaved_changes());

        let (remote_doc, remote_token) = remote.current();
        assert_eq!(remote_doc.cash, 52_000.0);
        assert_eq!(remote_doc.get("AAPL").unwrap().shares, 120.0);
        assert_eq!(remote_token, "v2");
    }

    #[tokio::test]
    async fn rejected_edit_keeps_prior_state() {
        let store = MemoryStore::seeded(sample_portfolio());
        let mut sentry = StockSentry::connect(Box::new(store)).await.unwrap();

        assert!(sentry.set_cash(-5.0).is_err());
        assert!(sentry.upsert_position("AAPL", "Apple", 1.0, -2.0).is_err());

        assert_eq!(sentry.portfolio().cash, 40_000.0);
        assert_eq!(sentry.portfolio().get("AAPL").unwrap().cost_basis, 180.0);
        assert!(!sentry.has_unsaved_changes());
    }

    #[tokio::test]
    async fn conflicting_sync_reloads_remote_state() {
        let store = MemoryStore::seeded(sample_portfolio());
        let mut first = StockSentry::connect(Box::new(store.clone())).await.unwrap();
        let mut second = StockSentry::connect(Box::new(store.clone())).await.unwrap();

        // first session wins the race
        first.set_cash(70_000.0).unwrap();
        first.sync().await.unwrap();

        // second session edits against the stale revision
        second.set_cash(10_000.0).unwrap();
        let err = second.sync().await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        // the losing edit was discarded in favor of the winning revision
        assert_eq!(second.portfolio().cash, 70_000.0);
        assert_eq!(second.version_token().as_str(), "v2");
        assert!(!second.has_unsaved_changes());

        // and the remote document was never overwritten blindly
        assert_eq!(store.current().0.cash, 70_000.0);
    }

    #[tokio::test]
    async fn redone_edit_after_conflict_syncs_cleanly() {
        let store = MemoryStore::seeded(sample_portfolio());
        let mut first = StockSentry::connect(Box::new(store.clone())).await.unwrap();
        let mut second = StockSentry::connect(Box::new(store.clone())).await.unwrap();

        first.set_cash(70_000.0).unwrap();
        first.sync().await.unwrap();

        second.set_cash(10_000.0).unwrap();
        assert!(second.sync().await.is_err());

        // redo the edit against the reloaded revision
        second.set_cash(10_000.0).unwrap();
        let token = second.sync().await.unwrap();
        assert_eq!(token.as_str(), "v3");
        assert_eq!(store.current().0.cash, 10_000.0);
    }

    #[tokio::test]
    async fn transport_failure_on_sync_keeps_local_state() {
        let mut sentry = StockSentry::connect(Box::new(FlakyWriteStore {
            seed: sample_portfolio(),
        }))
        .await
        .unwrap();

        sentry.set_cash(1_000.0).unwrap();
        let err = sentry.sync().await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));

        // nothing was discarded: retry next cycle
        assert!(sentry.has_unsaved_changes());
        assert_eq!(sentry.portfolio().cash, 1_000.0);
        assert_eq!(sentry.version_token().as_str(), "v1");
    }

    #[tokio::test]
    async fn reload_discards_local_edits() {
        let store = MemoryStore::seeded(sample_portfolio());
        let mut sentry = StockSentry::connect(Box::new(store)).await.unwrap();

        sentry.set_cash(1.0).unwrap();
        sentry.reload().await.unwrap();

        assert_eq!(sentry.portfolio().cash, 40_000.0);
        assert!(!sentry.has_unsaved_changes());
    }

    #[tokio::test]
    async fn advice_requires_fresh_quote() {
        let store = MemoryStore::seeded(sample_portfolio());
        let mut sentry = StockSentry::connect(Box::new(store)).await.unwrap();

        let err = sentry.advice_for("603679.SS").unwrap_err();
        assert!(matches!(err, CoreError::QuoteUnavailable(_)));

        sentry.set_cached_quote("603679.SS", 15.0);
        let advice = sentry.advice_for("603679.SS").unwrap();
        assert!((advice.total_assets - 79_000.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn advice_for_unknown_symbol_fails() {
        let store = MemoryStore::seeded(sample_portfolio());
        let sentry = StockSentry::connect(Box::new(store)).await.unwrap();

        let err = sentry.advice_for("TSLA").unwrap_err();
        assert!(matches!(err, CoreError::PositionNotFound(_)));
    }

    #[tokio::test]
    async fn dashboard_reflects_cached_quotes() {
        let store = MemoryStore::seeded(sample_portfolio());
        let mut sentry = StockSentry::connect(Box::new(store)).await.unwrap();

        sentry.set_cached_quote("603679.SS", 15.0);
        sentry.set_cached_quote("AAPL", 185.0);

        let dash = sentry.dashboard();
        assert!((dash.total_assets - 97_500.0).abs() < 1e-6);
        assert!(dash.positions.iter().all(|p| p.advice.is_some()));
    }

    #[tokio::test]
    async fn quote_cache_management() {
        let store = MemoryStore::seeded(sample_portfolio());
        let mut sentry = StockSentry::connect(Box::new(store)).await.unwrap();

        sentry.set_cached_quote("AAPL", 185.0);
        assert_eq!(sentry.quote_cache_len(), 1);
        assert!(sentry.invalidate_quote("AAPL"));
        assert_eq!(sentry.quote_cache_len(), 0);

        sentry.set_cached_quote("AAPL", 185.0);
        sentry.clear_quotes();
        assert_eq!(sentry.quote_cache_len(), 0);
    }
}
