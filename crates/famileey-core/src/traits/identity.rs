//! Identity provider trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::id::UserId;

/// Identity established from a verified bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Stable user identifier (token subject).
    pub uid: UserId,
    /// Email bound to the identity, if any.
    pub email: Option<String>,
}

/// Credentials for a new identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub phone: String,
    pub password: String,
    pub display_name: String,
}

/// Managed identity provider: verifies credentials, owns the
/// email/phone/password records, and issues custom tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Verify a bearer token. Fails with `Unauthorized` when it is invalid
    /// or expired.
    async fn verify_token(&self, token: &str) -> AppResult<VerifiedIdentity>;

    /// Look up an identity by email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserId>>;

    /// Look up an identity by phone number.
    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<UserId>>;

    /// Create an identity. Fails with `Conflict` if the email or phone is
    /// already claimed.
    async fn create_user(&self, identity: NewIdentity) -> AppResult<UserId>;

    /// Delete an identity and release its email and phone.
    async fn delete_user(&self, uid: &UserId) -> AppResult<()>;

    /// Issue a signed token for `uid`.
    async fn create_custom_token(&self, uid: &UserId) -> AppResult<String>;

    /// Exchange an email or phone plus password for the matching identity.
    async fn sign_in(&self, login: &str, password: &str) -> AppResult<UserId>;
}
