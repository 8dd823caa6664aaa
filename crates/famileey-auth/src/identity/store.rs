//! Identity provider persisted in the hierarchical store.
//!
//! Layout:
//! - `auth/accounts/{uid}`: credential record (never exposed to clients)
//! - `auth/emails/{key}`, `auth/phones/{key}`: uniqueness claims holding the
//!   owning uid, where `key` is the base64url form of the normalized value
//!
//! Claims are taken through store transactions, so two registrations racing
//! for the same email cannot both succeed.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use famileey_core::config::AuthConfig;
use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::traits::identity::{IdentityProvider, NewIdentity, VerifiedIdentity};
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::UserId;
use famileey_core::types::time::now_millis;
use famileey_core::types::update::MultiPathUpdate;
use famileey_database::StoreManager;

use crate::jwt::{JwtDecoder, JwtEncoder};
use crate::password::PasswordHasher;

const ACCOUNTS: &str = "auth/accounts";
const EMAILS: &str = "auth/emails";
const PHONES: &str = "auth/phones";

/// Credential record stored at `auth/accounts/{uid}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    email: String,
    phone: String,
    display_name: String,
    password_hash: String,
    created_at: i64,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

fn claim_path(index: &str, value: &str) -> String {
    format!("{index}/{}", URL_SAFE_NO_PAD.encode(value.as_bytes()))
}

/// [`IdentityProvider`] that keeps credentials in the same store as the
/// application data.
#[derive(Debug, Clone)]
pub struct StoreIdentityProvider {
    store: StoreManager,
    hasher: PasswordHasher,
    encoder: JwtEncoder,
    decoder: JwtDecoder,
}

impl StoreIdentityProvider {
    pub fn new(store: StoreManager, config: &AuthConfig) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
        }
    }

    async fn account(&self, uid: &UserId) -> AppResult<Option<AccountRecord>> {
        self.store.get_json(&format!("{ACCOUNTS}/{uid}")).await
    }

    async fn lookup(&self, index: &str, value: &str) -> AppResult<Option<UserId>> {
        let owner = self.store.get(&claim_path(index, value)).await?;
        Ok(owner.and_then(|v| v.as_str().map(UserId::from)))
    }

    /// Claim `value` in `index` for `uid`. Returns `false` when another
    /// identity already holds it.
    async fn claim(&self, index: &str, value: &str, uid: &UserId) -> AppResult<bool> {
        let proposed = Value::from(uid.as_str());
        let result = self
            .store
            .transaction(&claim_path(index, value), &move |current| match current {
                Some(_) => None,
                None => Some(proposed.clone()),
            })
            .await?;
        Ok(result.committed)
    }
}

#[async_trait]
impl IdentityProvider for StoreIdentityProvider {
    async fn verify_token(&self, token: &str) -> AppResult<VerifiedIdentity> {
        let claims = self.decoder.decode(token)?;
        if self.account(&claims.sub).await?.is_none() {
            return Err(AppError::unauthorized("Identity no longer exists"));
        }
        Ok(VerifiedIdentity {
            uid: claims.sub,
            email: claims.email,
        })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserId>> {
        self.lookup(EMAILS, &normalize_email(email)).await
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<UserId>> {
        self.lookup(PHONES, &normalize_phone(phone)).await
    }

    async fn create_user(&self, identity: NewIdentity) -> AppResult<UserId> {
        let email = normalize_email(&identity.email);
        let phone = normalize_phone(&identity.phone);
        if email.is_empty() || phone.is_empty() {
            return Err(AppError::validation("Email and phone are required"));
        }

        let uid = UserId::new();
        if !self.claim(EMAILS, &email, &uid).await? {
            return Err(AppError::conflict("Email is already registered"));
        }
        if !self.claim(PHONES, &phone, &uid).await? {
            self.store.remove(&claim_path(EMAILS, &email)).await?;
            return Err(AppError::conflict("Phone number is already registered"));
        }

        let record = AccountRecord {
            email,
            phone,
            display_name: identity.display_name,
            password_hash: self.hasher.hash_password(&identity.password)?,
            created_at: now_millis(),
        };
        self.store
            .set_json(&format!("{ACCOUNTS}/{uid}"), &record)
            .await?;

        info!(uid = %uid, "Identity created");
        Ok(uid)
    }

    async fn delete_user(&self, uid: &UserId) -> AppResult<()> {
        let Some(record) = self.account(uid).await? else {
            return Err(AppError::not_found(format!("Identity '{uid}' not found")));
        };

        let mut update = MultiPathUpdate::new();
        update.remove(format!("{ACCOUNTS}/{uid}"));
        if self.lookup(EMAILS, &record.email).await?.as_ref() == Some(uid) {
            update.remove(claim_path(EMAILS, &record.email));
        }
        if self.lookup(PHONES, &record.phone).await?.as_ref() == Some(uid) {
            update.remove(claim_path(PHONES, &record.phone));
        }
        self.store.update(update).await?;

        info!(uid = %uid, "Identity deleted");
        Ok(())
    }

    async fn create_custom_token(&self, uid: &UserId) -> AppResult<String> {
        let record = self.account(uid).await?;
        self.encoder
            .issue(uid, record.as_ref().map(|r| r.email.as_str()))
    }

    async fn sign_in(&self, login: &str, password: &str) -> AppResult<UserId> {
        let uid = if login.contains('@') {
            self.find_by_email(login).await?
        } else {
            self.find_by_phone(login).await?
        };
        let invalid = || AppError::unauthorized("Invalid credentials");

        let Some(uid) = uid else {
            return Err(invalid());
        };
        let Some(record) = self.account(&uid).await? else {
            warn!(uid = %uid, "Login index points at a missing identity");
            return Err(invalid());
        };
        if !self.hasher.verify_password(password, &record.password_hash)? {
            return Err(invalid());
        }
        Ok(uid)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use famileey_core::error::ErrorKind;
    use famileey_database::store::MemoryStore;

    fn provider() -> StoreIdentityProvider {
        StoreIdentityProvider::new(
            StoreManager::from_store(Arc::new(MemoryStore::new())),
            &AuthConfig::default(),
        )
    }

    fn identity(email: &str, phone: &str) -> NewIdentity {
        NewIdentity {
            email: email.into(),
            phone: phone.into(),
            password: "s3cret-pass".into(),
            display_name: "Nwosu".into(),
        }
    }

    #[tokio::test]
    async fn test_create_sign_in_and_verify() {
        let provider = provider();
        let uid = provider
            .create_user(identity("Nwosu@Example.com", "+234 800 000 0001"))
            .await
            .unwrap();

        assert_eq!(
            provider.find_by_email("nwosu@example.com").await.unwrap(),
            Some(uid.clone())
        );
        assert_eq!(
            provider.find_by_phone("+2348000000001").await.unwrap(),
            Some(uid.clone())
        );

        let signed_in = provider
            .sign_in("nwosu@example.com", "s3cret-pass")
            .await
            .unwrap();
        assert_eq!(signed_in, uid);
        let err = provider.sign_in("+2348000000001", "nope").await.unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));

        let token = provider.create_custom_token(&uid).await.unwrap();
        let verified = provider.verify_token(&token).await.unwrap();
        assert_eq!(verified.uid, uid);
    }

    #[tokio::test]
    async fn test_duplicate_email_or_phone_conflicts() {
        let provider = provider();
        provider
            .create_user(identity("a@example.com", "+1000"))
            .await
            .unwrap();

        let err = provider
            .create_user(identity("A@example.com", "+2000"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));

        let err = provider
            .create_user(identity("b@example.com", "+1000"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
        // The email claimed before the phone conflict was released.
        assert_eq!(provider.find_by_email("b@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_deleted_identity_releases_claims_and_tokens() {
        let provider = provider();
        let uid = provider
            .create_user(identity("c@example.com", "+3000"))
            .await
            .unwrap();
        let token = provider.create_custom_token(&uid).await.unwrap();

        provider.delete_user(&uid).await.unwrap();
        assert_eq!(provider.find_by_email("c@example.com").await.unwrap(), None);
        let err = provider.verify_token(&token).await.unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
    }
}
