use thiserror::Error;

/// Unified error type for the entire stock-sentry-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input / Business Logic ──────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Position not found: {0}")]
    PositionNotFound(String),

    #[error("No fresh quote available for {0}")]
    QuoteUnavailable(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No quote provider available")]
    NoProvider,

    // ── Holdings Store ──────────────────────────────────────────────
    #[error("Holdings document not found at {0} — provision it before using the store")]
    NotFound(String),

    #[error("Holdings document changed upstream: {0}")]
    Conflict(String),

    #[error("Invalid holdings document: {0}")]
    InvalidDocument(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs to prevent
        // credential leakage. reqwest errors often contain full URLs with secrets.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
