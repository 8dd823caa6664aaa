//! Account registration, sign-in, and profile management.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{error, info};
use validator::Validate;

use famileey_auth::password::PasswordValidator;
use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::traits::identity::{IdentityProvider, NewIdentity};
use famileey_core::types::id::UserId;
use famileey_database::repositories::UserRepository;
use famileey_entity::user::{ProfileView, UPDATABLE_PROFILE_FIELDS};

use super::profile::ProfileReader;
use super::registration::{RegistrationRequest, describe};
use crate::context::RequestContext;

/// Handles registration, sign-in, and profile reads and updates.
#[derive(Debug, Clone)]
pub struct AccountService {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<UserRepository>,
    profiles: ProfileReader,
    passwords: PasswordValidator,
}

impl AccountService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        users: Arc<UserRepository>,
        profiles: ProfileReader,
        passwords: PasswordValidator,
    ) -> Self {
        Self {
            identity,
            users,
            profiles,
            passwords,
        }
    }

    /// Registers a family and returns a custom token for it.
    ///
    /// If the profile write fails after the identity was created, the
    /// identity is deleted again. A crash between the two steps can still
    /// leave an orphaned identity.
    pub async fn register(&self, request: RegistrationRequest) -> AppResult<String> {
        request
            .validate()
            .map_err(|e| AppError::validation(describe(&e)))?;
        self.passwords.validate(&request.password)?;

        if self.identity.find_by_email(&request.email).await?.is_some()
            || self.identity.find_by_phone(&request.phone).await?.is_some()
        {
            info!(email = %request.email, "Registration rejected: user already exists");
            return Err(AppError::conflict("User already exists"));
        }

        let uid = self
            .identity
            .create_user(NewIdentity {
                email: request.email.clone(),
                phone: request.phone.clone(),
                password: request.password.clone(),
                display_name: request.family_name.clone(),
            })
            .await?;

        if let Err(e) = self.users.create(&uid, &request.to_profile()).await {
            error!(uid = %uid, error = %e, "Profile write failed, rolling back identity");
            if let Err(rollback) = self.identity.delete_user(&uid).await {
                error!(uid = %uid, error = %rollback, "Identity rollback failed");
            }
            return Err(e);
        }

        let token = self.identity.create_custom_token(&uid).await?;
        info!(uid = %uid, "User registered");
        Ok(token)
    }

    /// Exchanges credentials for a custom token.
    pub async fn login(&self, login: &str, password: &str) -> AppResult<(UserId, String)> {
        if login.trim().is_empty() || password.is_empty() {
            return Err(AppError::validation("Login and password are required"));
        }
        let uid = self.identity.sign_in(login.trim(), password).await?;
        let token = self.identity.create_custom_token(&uid).await?;
        Ok((uid, token))
    }

    /// Profile of `uid` with follow counts.
    pub async fn get_profile(&self, uid: &UserId) -> AppResult<ProfileView> {
        self.profiles.require(uid).await
    }

    /// Applies an update restricted to the allowed profile keys.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        fields: Map<String, Value>,
    ) -> AppResult<ProfileView> {
        if fields.is_empty() {
            return Err(AppError::validation("Update data must not be empty"));
        }

        let mut rejected: Vec<&str> = fields
            .keys()
            .map(String::as_str)
            .filter(|key| !UPDATABLE_PROFILE_FIELDS.contains(key))
            .collect();
        if !rejected.is_empty() {
            rejected.sort_unstable();
            return Err(AppError::validation(format!(
                "Fields not allowed: {}. Only {} may be updated",
                rejected.join(", "),
                UPDATABLE_PROFILE_FIELDS.join(", ")
            )));
        }
        if let Some((key, _)) = fields
            .iter()
            .find(|(_, value)| !(value.is_string() || value.is_null()))
        {
            return Err(AppError::validation(format!("Field '{key}' must be a string")));
        }
        if fields
            .get("familyName")
            .is_some_and(|v| v.as_str().is_none_or(|s| s.trim().is_empty()))
        {
            return Err(AppError::validation("familyName must not be empty"));
        }

        if !self.users.exists(&ctx.user_id).await? {
            return Err(AppError::not_found("User does not exist"));
        }
        self.users.update_fields(&ctx.user_id, fields).await?;
        info!(uid = %ctx.user_id, "Profile updated");
        self.profiles.require(&ctx.user_id).await
    }
}
