//! Device push tokens at `expo-tokens/{uid}`. One token per user.

use serde_json::Value;

use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::UserId;

use crate::store::StoreManager;

#[derive(Debug, Clone)]
pub struct PushTokenRepository {
    store: StoreManager,
}

impl PushTokenRepository {
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    /// Register `token` for `uid`, replacing any previous token.
    pub async fn save(&self, uid: &UserId, token: &str) -> AppResult<()> {
        self.store
            .set(&format!("expo-tokens/{uid}"), Value::from(token))
            .await
    }

    pub async fn find(&self, uid: &UserId) -> AppResult<Option<String>> {
        let token = self.store.get(&format!("expo-tokens/{uid}")).await?;
        Ok(token.and_then(|v| v.as_str().map(str::to_string)))
    }
}
