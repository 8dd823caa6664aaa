//! Post view counters at `postViews/{postId}/count`.

use std::collections::HashMap;

use serde_json::Value;

use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::PostId;

use crate::store::StoreManager;

#[derive(Debug, Clone)]
pub struct ViewRepository {
    store: StoreManager,
}

impl ViewRepository {
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    /// Increment the counter through a store transaction and return the new
    /// count. Concurrent calls never lose increments.
    pub async fn increment(&self, post: &PostId) -> AppResult<u64> {
        let result = self
            .store
            .transaction(&format!("postViews/{post}/count"), &|current| {
                let count = current.and_then(|v| v.as_u64()).unwrap_or(0);
                Some(Value::from(count + 1))
            })
            .await?;
        result
            .snapshot
            .and_then(|v| v.as_u64())
            .ok_or_else(|| AppError::internal("View counter transaction returned no value"))
    }

    pub async fn count(&self, post: &PostId) -> AppResult<u64> {
        Ok(self
            .store
            .get(&format!("postViews/{post}/count"))
            .await?
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }

    /// View count of every post that has been viewed.
    pub async fn all_counts(&self) -> AppResult<HashMap<PostId, u64>> {
        let Some(Value::Object(posts)) = self.store.get("postViews").await? else {
            return Ok(HashMap::new());
        };
        Ok(posts
            .into_iter()
            .filter_map(|(post, counter)| {
                let count = counter.get("count").and_then(Value::as_u64)?;
                Some((PostId::from(post), count))
            })
            .collect())
    }
}
