//! Identity and token configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret key for custom token signing (HMAC-SHA256).
    pub jwt_secret: String,
    /// Issuer claim written into and required on every token.
    pub issuer: String,
    /// Custom token TTL in hours.
    pub token_ttl_hours: u64,
    /// Minimum password length accepted at registration.
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "CHANGE_ME_IN_PRODUCTION".to_string(),
            issuer: "famileey".to_string(),
            token_ttl_hours: 24 * 7,
            password_min_length: 6,
        }
    }
}
