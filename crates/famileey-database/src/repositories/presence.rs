//! Presence flags at `inChat/{uid}/{chatId}`.

use serde_json::Value;

use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::UserId;

use crate::store::StoreManager;

#[derive(Debug, Clone)]
pub struct PresenceRepository {
    store: StoreManager,
}

impl PresenceRepository {
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    /// Record whether `uid` is viewing `chat`.
    pub async fn set(&self, uid: &UserId, chat: &str, in_chat: bool) -> AppResult<()> {
        self.store
            .set(&format!("inChat/{uid}/{chat}"), Value::Bool(in_chat))
            .await
    }

    /// Whether `uid` is currently viewing `chat`.
    pub async fn is_in_chat(&self, uid: &UserId, chat: &str) -> AppResult<bool> {
        let flag = self.store.get(&format!("inChat/{uid}/{chat}")).await?;
        Ok(flag.and_then(|v| v.as_bool()).unwrap_or(false))
    }
}
