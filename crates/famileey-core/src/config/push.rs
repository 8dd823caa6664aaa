//! Push delivery configuration.

use serde::{Deserialize, Serialize};

/// Expo push service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Whether push messages are delivered at all.
    pub enabled: bool,
    /// Expo push send endpoint.
    pub endpoint: String,
    /// Optional Expo access token (enhanced push security).
    pub access_token: Option<String>,
    /// Title shown on every push message.
    pub title: String,
    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://exp.host/--/api/v2/push/send".to_string(),
            access_token: None,
            title: "Famileey".to_string(),
            request_timeout_seconds: 10,
        }
    }
}
