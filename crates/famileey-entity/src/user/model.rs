//! User profile model.

use serde::{Deserialize, Serialize};

use famileey_core::types::id::UserId;

use super::role::UserRole;

/// Profile keys a user may change through the update endpoint.
pub const UPDATABLE_PROFILE_FIELDS: &[&str] = &[
    "familyName",
    "nativeOf",
    "district",
    "province",
    "country",
    "residence",
    "phone",
    "occupation",
    "worksAt",
    "bio",
    "photoUrl",
];

/// A family profile stored at `users/{uid}`.
///
/// Credentials never live here; the identity provider owns them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name of the family.
    #[serde(default)]
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub works_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    /// Registration time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl UserProfile {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// A profile as returned to clients, with follow counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub uid: UserId,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub following_count: usize,
    pub followers_count: usize,
}

/// A profile keyed by its user id, as returned by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListing {
    pub id: UserId,
    #[serde(flatten)]
    pub profile: UserProfile,
}
