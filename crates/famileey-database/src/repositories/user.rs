//! User profile repository.

use serde_json::{Map, Value};
use tracing::warn;

use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::UserId;
use famileey_core::types::update::MultiPathUpdate;
use famileey_entity::user::{UserProfile, UserRole};

use crate::store::StoreManager;

const USERS: &str = "users";

/// Repository for profiles stored at `users/{uid}`.
#[derive(Debug, Clone)]
pub struct UserRepository {
    store: StoreManager,
}

impl UserRepository {
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    fn path(uid: &UserId) -> String {
        format!("{USERS}/{uid}")
    }

    /// Find a profile by user id.
    pub async fn find_by_id(&self, uid: &UserId) -> AppResult<Option<UserProfile>> {
        self.store.get_json(&Self::path(uid)).await
    }

    /// Check whether a profile exists.
    pub async fn exists(&self, uid: &UserId) -> AppResult<bool> {
        Ok(self.store.get(&Self::path(uid)).await?.is_some())
    }

    /// All profiles, in key order. Records that do not parse are skipped.
    pub async fn find_all(&self) -> AppResult<Vec<(UserId, UserProfile)>> {
        let Some(Value::Object(users)) = self.store.get(USERS).await? else {
            return Ok(Vec::new());
        };
        let mut profiles = Vec::with_capacity(users.len());
        for (uid, raw) in users {
            match serde_json::from_value::<UserProfile>(raw) {
                Ok(profile) => profiles.push((UserId::from(uid), profile)),
                Err(e) => warn!(uid = %uid, error = %e, "Skipping malformed user record"),
            }
        }
        Ok(profiles)
    }

    /// Write a complete profile.
    pub async fn create(&self, uid: &UserId, profile: &UserProfile) -> AppResult<()> {
        self.store.set_json(&Self::path(uid), profile).await
    }

    /// Merge `fields` into an existing profile.
    pub async fn update_fields(&self, uid: &UserId, fields: Map<String, Value>) -> AppResult<()> {
        let mut update = MultiPathUpdate::new();
        for (key, value) in fields {
            update.set(format!("{}/{key}", Self::path(uid)), value);
        }
        if update.is_empty() {
            return Ok(());
        }
        self.store.update(update).await
    }

    /// Set the role of a user.
    pub async fn set_role(&self, uid: &UserId, role: UserRole) -> AppResult<()> {
        self.store
            .set(&format!("{}/role", Self::path(uid)), Value::from(role.as_str()))
            .await
    }
}
