//! Store manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use famileey_core::config::StoreConfig;
use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::traits::store::{KeyValueStore, TransactionFn, TransactionResult};
use famileey_core::types::update::MultiPathUpdate;

/// Store manager that wraps the configured store provider.
///
/// The provider is selected at construction time based on configuration.
/// Every repository receives a clone of this handle.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store provider.
    inner: Arc<dyn KeyValueStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn KeyValueStore> = match config.provider.as_str() {
            #[cfg(feature = "firebase")]
            "firebase" => {
                info!(url = %config.firebase.database_url, "Initializing realtime database store");
                Arc::new(crate::store::firebase::FirebaseStore::new(&config.firebase)?)
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory store");
                Arc::new(crate::store::memory::MemoryStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory, firebase"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing provider (for testing).
    pub fn from_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self { inner: store }
    }

    /// Get a reference to the inner provider.
    pub fn provider(&self) -> &dyn KeyValueStore {
        self.inner.as_ref()
    }
}

#[async_trait]
impl KeyValueStore for StoreManager {
    async fn get(&self, path: &str) -> AppResult<Option<Value>> {
        self.inner.get(path).await
    }

    async fn set(&self, path: &str, value: Value) -> AppResult<()> {
        self.inner.set(path, value).await
    }

    async fn update(&self, update: MultiPathUpdate) -> AppResult<()> {
        self.inner.update(update).await
    }

    async fn remove(&self, path: &str) -> AppResult<()> {
        self.inner.remove(path).await
    }

    async fn get_ordered(&self, path: &str, child: &str) -> AppResult<Vec<(String, Value)>> {
        self.inner.get_ordered(path, child).await
    }

    async fn transaction(&self, path: &str, apply: &TransactionFn) -> AppResult<TransactionResult> {
        self.inner.transaction(path, apply).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_provider_is_a_configuration_error() {
        let config = StoreConfig {
            provider: "etcd".into(),
            ..Default::default()
        };
        let err = StoreManager::new(&config).await.unwrap_err();
        assert!(err.is(famileey_core::error::ErrorKind::Configuration));
    }

    #[tokio::test]
    async fn test_typed_helpers_through_manager() {
        let store = StoreManager::new(&StoreConfig::default()).await.unwrap();
        store.set_json("expo-tokens/u1", &"ExpoPushToken[x]").await.unwrap();
        let token: Option<String> = store.get_json("expo-tokens/u1").await.unwrap();
        assert_eq!(token.as_deref(), Some("ExpoPushToken[x]"));
    }
}
