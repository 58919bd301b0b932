use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

/// Opaque value identifying the exact persisted revision of the holdings
/// document. Supplied by the store on every read and successful write;
/// required on write so a concurrent modification is detected instead of
/// overwritten blindly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionToken(pub String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait abstraction for the remote holdings store.
///
/// The document is read and overwritten wholesale; the version token is the
/// optimistic-concurrency guard. Outcomes the protocol distinguishes map to
/// distinct `CoreError` variants: `NotFound` (document missing), `Conflict`
/// (stale token on write), `Network`/`Api` (transport trouble).
#[async_trait]
pub trait HoldingsStore: Send + Sync {
    /// Human-readable name of this store (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the current holdings document and its version token.
    async fn load(&self) -> Result<(Portfolio, VersionToken), CoreError>;

    /// Overwrite the holdings document, guarded by `token`.
    ///
    /// Returns the replacement token on success. Fails with `Conflict` when
    /// `token` no longer matches the stored revision; the caller must
    /// reload and surface the conflict, never retry the same write.
    async fn save(
        &self,
        portfolio: &Portfolio,
        token: &VersionToken,
    ) -> Result<VersionToken, CoreError>;
}
