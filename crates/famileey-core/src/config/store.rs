//! Hierarchical key-value store configuration.

use serde::{Deserialize, Serialize};

/// Selects and configures the store backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store provider: `"memory"` or `"firebase"`.
    pub provider: String,
    /// Hosted realtime database settings.
    pub firebase: FirebaseStoreConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            firebase: FirebaseStoreConfig::default(),
        }
    }
}

/// Settings for the hosted realtime database REST endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseStoreConfig {
    /// Database URL, e.g. `https://<project>.firebaseio.com`.
    pub database_url: String,
    /// Database secret or ID token passed as the `auth` query parameter.
    pub credential: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_seconds: u64,
    /// Attempts before a contended transaction gives up.
    pub max_transaction_retries: u32,
}

impl Default for FirebaseStoreConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            credential: None,
            request_timeout_seconds: 10,
            max_transaction_retries: 25,
        }
    }
}
