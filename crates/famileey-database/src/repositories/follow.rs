//! Follow edges and pending follow requests.
//!
//! An edge `a -> b` lives at both `following/a/b` and `followers/b/a`.
//! Both sides are only ever written through one multi-path update.

use std::collections::BTreeSet;

use serde_json::Value;

use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::UserId;
use famileey_core::types::update::MultiPathUpdate;

use super::true_keys;
use crate::store::StoreManager;

/// Repository for the mirrored follow edges.
#[derive(Debug, Clone)]
pub struct FollowRepository {
    store: StoreManager,
}

impl FollowRepository {
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    fn following_path(follower: &UserId, followee: &UserId) -> String {
        format!("following/{follower}/{followee}")
    }

    fn follower_path(followee: &UserId, follower: &UserId) -> String {
        format!("followers/{followee}/{follower}")
    }

    /// Users `uid` follows.
    pub async fn following(&self, uid: &UserId) -> AppResult<BTreeSet<UserId>> {
        Ok(true_keys(self.store.get(&format!("following/{uid}")).await?))
    }

    /// Users following `uid`.
    pub async fn followers(&self, uid: &UserId) -> AppResult<BTreeSet<UserId>> {
        Ok(true_keys(self.store.get(&format!("followers/{uid}")).await?))
    }

    /// Whether `follower` follows `followee`.
    pub async fn is_following(&self, follower: &UserId, followee: &UserId) -> AppResult<bool> {
        let edge = self
            .store
            .get(&Self::following_path(follower, followee))
            .await?;
        Ok(edge.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    /// Stage both sides of `follower -> followee`.
    pub fn stage_follow(update: &mut MultiPathUpdate, follower: &UserId, followee: &UserId) {
        update
            .set(Self::following_path(follower, followee), true)
            .set(Self::follower_path(followee, follower), true);
    }

    /// Stage removal of both sides of `follower -> followee`.
    pub fn stage_unfollow(update: &mut MultiPathUpdate, follower: &UserId, followee: &UserId) {
        update
            .remove(Self::following_path(follower, followee))
            .remove(Self::follower_path(followee, follower));
    }

    /// Create the edge atomically.
    pub async fn follow(&self, follower: &UserId, followee: &UserId) -> AppResult<()> {
        let mut update = MultiPathUpdate::new();
        Self::stage_follow(&mut update, follower, followee);
        self.store.update(update).await
    }

    /// Remove the edge atomically.
    pub async fn unfollow(&self, follower: &UserId, followee: &UserId) -> AppResult<()> {
        let mut update = MultiPathUpdate::new();
        Self::stage_unfollow(&mut update, follower, followee);
        self.store.update(update).await
    }
}

/// Repository for pending requests at `followRequests/{target}/{requester}`.
#[derive(Debug, Clone)]
pub struct FollowRequestRepository {
    store: StoreManager,
}

impl FollowRequestRepository {
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    fn path(target: &UserId, requester: &UserId) -> String {
        format!("followRequests/{target}/{requester}")
    }

    /// Whether `requester` has a pending request to `target`.
    pub async fn exists(&self, target: &UserId, requester: &UserId) -> AppResult<bool> {
        let request = self.store.get(&Self::path(target, requester)).await?;
        Ok(request.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    /// Pending requesters of `target`.
    pub async fn pending(&self, target: &UserId) -> AppResult<BTreeSet<UserId>> {
        Ok(true_keys(
            self.store.get(&format!("followRequests/{target}")).await?,
        ))
    }

    /// Record a pending request.
    pub async fn create(&self, target: &UserId, requester: &UserId) -> AppResult<()> {
        self.store
            .set(&Self::path(target, requester), Value::Bool(true))
            .await
    }

    /// Stage deletion of a pending request.
    pub fn stage_remove(update: &mut MultiPathUpdate, target: &UserId, requester: &UserId) {
        update.remove(Self::path(target, requester));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_follow_and_unfollow_keep_both_sides_in_step() {
        let store = StoreManager::from_store(Arc::new(MemoryStore::new()));
        let repo = FollowRepository::new(store.clone());
        let (a, b) = (UserId::from("a"), UserId::from("b"));

        repo.follow(&a, &b).await.unwrap();
        assert!(repo.is_following(&a, &b).await.unwrap());
        assert!(repo.followers(&b).await.unwrap().contains(&a));
        assert!(!repo.is_following(&b, &a).await.unwrap());

        repo.unfollow(&a, &b).await.unwrap();
        assert!(repo.following(&a).await.unwrap().is_empty());
        assert!(repo.followers(&b).await.unwrap().is_empty());
        assert_eq!(store.get("following").await.unwrap(), None);
    }
}
