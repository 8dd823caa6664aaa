//! Like repository. Presence of `likes/{postId}/{uid}` is the like.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;
use tracing::warn;

use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::{PostId, UserId};
use famileey_entity::post::Like;

use crate::store::StoreManager;

#[derive(Debug, Clone)]
pub struct LikeRepository {
    store: StoreManager,
}

impl LikeRepository {
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    fn path(post: &PostId, uid: &UserId) -> String {
        format!("likes/{post}/{uid}")
    }

    /// Record a like. Liking twice overwrites the same record.
    pub async fn like(&self, like: &Like) -> AppResult<()> {
        self.store
            .set_json(&Self::path(&like.postid, &like.uid), like)
            .await
    }

    pub async fn unlike(&self, post: &PostId, uid: &UserId) -> AppResult<()> {
        self.store.remove(&Self::path(post, uid)).await
    }

    pub async fn exists(&self, post: &PostId, uid: &UserId) -> AppResult<bool> {
        Ok(self.store.get(&Self::path(post, uid)).await?.is_some())
    }

    /// Users who liked `post`.
    pub async fn likers(&self, post: &PostId) -> AppResult<BTreeSet<UserId>> {
        match self.store.get(&format!("likes/{post}")).await? {
            Some(Value::Object(map)) => {
                Ok(map.into_iter().map(|(uid, _)| UserId::from(uid)).collect())
            }
            _ => Ok(BTreeSet::new()),
        }
    }

    /// Like records of `post`, oldest first.
    pub async fn list(&self, post: &PostId) -> AppResult<Vec<Like>> {
        let children = self
            .store
            .get_ordered(&format!("likes/{post}"), "timestamp")
            .await?;
        let mut likes = Vec::with_capacity(children.len());
        for (uid, raw) in children {
            match serde_json::from_value::<Like>(raw) {
                Ok(like) => likes.push(like),
                Err(e) => warn!(post_id = %post, uid = %uid, error = %e, "Skipping malformed like"),
            }
        }
        Ok(likes)
    }

    /// Likers of every post.
    pub async fn all_likers(&self) -> AppResult<HashMap<PostId, BTreeSet<UserId>>> {
        let Some(Value::Object(posts)) = self.store.get("likes").await? else {
            return Ok(HashMap::new());
        };
        Ok(posts
            .into_iter()
            .map(|(post, likes)| {
                let users = match likes {
                    Value::Object(map) => map.into_iter().map(|(uid, _)| UserId::from(uid)).collect(),
                    _ => BTreeSet::new(),
                };
                (PostId::from(post), users)
            })
            .collect())
    }
}
