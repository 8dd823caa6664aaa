//! Comment repository.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::{CommentId, PostId};
use famileey_entity::post::Comment;

use super::child_count;
use crate::store::StoreManager;

/// Repository for comments stored at `comments/{postId}/{commentId}`.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    store: StoreManager,
}

impl CommentRepository {
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    fn path(post: &PostId, comment: &CommentId) -> String {
        format!("comments/{post}/{comment}")
    }

    pub async fn create(&self, comment: &Comment) -> AppResult<CommentId> {
        let id = CommentId::new();
        self.store
            .set_json(&Self::path(&comment.postid, &id), comment)
            .await?;
        Ok(id)
    }

    pub async fn find(&self, post: &PostId, comment: &CommentId) -> AppResult<Option<Comment>> {
        self.store.get_json(&Self::path(post, comment)).await
    }

    pub async fn remove(&self, post: &PostId, comment: &CommentId) -> AppResult<()> {
        self.store.remove(&Self::path(post, comment)).await
    }

    /// Comments of `post`, oldest first.
    pub async fn list(&self, post: &PostId) -> AppResult<Vec<(CommentId, Comment)>> {
        let children = self
            .store
            .get_ordered(&format!("comments/{post}"), "timestamp")
            .await?;
        let mut comments = Vec::with_capacity(children.len());
        for (id, raw) in children {
            match serde_json::from_value::<Comment>(raw) {
                Ok(comment) => comments.push((CommentId::from(id), comment)),
                Err(e) => warn!(post_id = %post, comment_id = %id, error = %e, "Skipping malformed comment"),
            }
        }
        Ok(comments)
    }

    pub async fn count(&self, post: &PostId) -> AppResult<u64> {
        Ok(child_count(&self.store.get(&format!("comments/{post}")).await?))
    }

    /// Comment count of every post that has comments.
    pub async fn all_counts(&self) -> AppResult<HashMap<PostId, u64>> {
        let Some(Value::Object(posts)) = self.store.get("comments").await? else {
            return Ok(HashMap::new());
        };
        Ok(posts
            .into_iter()
            .map(|(post, comments)| (PostId::from(post), child_count(&Some(comments))))
            .collect())
    }
}
