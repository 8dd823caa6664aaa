//! Profile views with follow counts.

use std::sync::Arc;

use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::types::id::UserId;
use famileey_database::repositories::{FollowRepository, UserRepository};
use famileey_entity::user::{ProfileView, UserProfile};

/// Loads profiles together with their following and follower counts.
#[derive(Debug, Clone)]
pub struct ProfileReader {
    users: Arc<UserRepository>,
    follows: Arc<FollowRepository>,
}

impl ProfileReader {
    pub fn new(users: Arc<UserRepository>, follows: Arc<FollowRepository>) -> Self {
        Self { users, follows }
    }

    /// Profile, following set, and follower set are read concurrently.
    pub async fn load(&self, uid: &UserId) -> AppResult<Option<ProfileView>> {
        let (profile, following, followers) = tokio::try_join!(
            self.users.find_by_id(uid),
            self.follows.following(uid),
            self.follows.followers(uid),
        )?;
        Ok(profile.map(|profile| ProfileView {
            uid: uid.clone(),
            profile,
            following_count: following.len(),
            followers_count: followers.len(),
        }))
    }

    /// Like [`load`](Self::load) but a missing profile is `NotFound`.
    pub async fn require(&self, uid: &UserId) -> AppResult<ProfileView> {
        self.load(uid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{uid}' not found")))
    }

    /// The bare stored profile.
    pub async fn profile(&self, uid: &UserId) -> AppResult<Option<UserProfile>> {
        self.users.find_by_id(uid).await
    }

    pub async fn require_profile(&self, uid: &UserId) -> AppResult<UserProfile> {
        self.profile(uid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{uid}' not found")))
    }
}
