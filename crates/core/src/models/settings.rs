use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::thresholds::ThresholdParameters;

/// User-configurable settings for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Strategy thresholds driving the advice evaluator.
    pub thresholds: ThresholdParameters,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage").
    /// Values: the API key string.
    pub api_keys: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            thresholds: ThresholdParameters::default(),
            api_keys: HashMap::new(),
        }
    }
}
