//! Hierarchical key-value store trait.
//!
//! Locations are slash-separated paths (`"followers/u1/u2"`). A missing
//! location reads as `None`; writing JSON `null` to a location deletes it.

use async_trait::async_trait;
use serde_json::Value;

use crate::result::AppResult;
use crate::types::update::MultiPathUpdate;

/// Closure applied by [`KeyValueStore::transaction`].
///
/// Receives the current value at the location and returns the value to
/// write, or `None` to abort without writing. The closure may be invoked
/// more than once when the location is contended.
pub type TransactionFn = dyn Fn(Option<Value>) -> Option<Value> + Send + Sync;

/// Outcome of a read-modify-write transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionResult {
    /// `false` when the closure aborted.
    pub committed: bool,
    /// The value at the location after the transaction.
    pub snapshot: Option<Value>,
}

/// Trait for the hosted hierarchical store (remote realtime database or the
/// in-process tree used for development and tests).
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Read the subtree at `path`.
    async fn get(&self, path: &str) -> AppResult<Option<Value>>;

    /// Replace the subtree at `path`.
    async fn set(&self, path: &str, value: Value) -> AppResult<()>;

    /// Apply every entry of `update` with all-or-nothing visibility.
    async fn update(&self, update: MultiPathUpdate) -> AppResult<()>;

    /// Delete the subtree at `path`.
    async fn remove(&self, path: &str) -> AppResult<()>;

    /// Read the children of `path` ordered ascending by the value of
    /// `child` inside each of them (keys break ties).
    async fn get_ordered(&self, path: &str, child: &str) -> AppResult<Vec<(String, Value)>>;

    /// Optimistic read-modify-write of the value at `path`.
    async fn transaction(&self, path: &str, apply: &TransactionFn) -> AppResult<TransactionResult>;

    /// Check that the store backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Get a typed value by deserializing the subtree.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        path: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(path).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing it to a subtree.
    async fn set_json<T: serde::Serialize + Send + Sync>(
        &self,
        path: &str,
        value: &T,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_value(value)?;
        self.set(path, json).await
    }
}
