//! Registration input.

use serde::{Deserialize, Serialize};
use validator::Validate;

use famileey_core::types::time::now_millis;
use famileey_entity::user::{UserProfile, UserRole};

/// Fields required to register a family. Missing fields read as empty and
/// are reported by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationRequest {
    #[validate(length(min = 1, message = "familyName is required"))]
    pub family_name: String,
    #[validate(length(min = 1, message = "nativeOf is required"))]
    pub native_of: String,
    #[validate(length(min = 1, message = "district is required"))]
    pub district: String,
    #[validate(length(min = 1, message = "province is required"))]
    pub province: String,
    #[validate(length(min = 1, message = "country is required"))]
    pub country: String,
    #[validate(length(min = 1, message = "residence is required"))]
    pub residence: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 4, message = "phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "occupation is required"))]
    pub occupation: String,
    #[validate(length(min = 1, message = "worksAt is required"))]
    pub works_at: String,
    pub password: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
}

impl RegistrationRequest {
    /// The profile stored for this registration. The password is not part
    /// of it.
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            family_name: self.family_name.trim().to_string(),
            native_of: Some(self.native_of.clone()),
            district: Some(self.district.clone()),
            province: Some(self.province.clone()),
            country: Some(self.country.clone()),
            residence: Some(self.residence.clone()),
            email: Some(self.email.trim().to_lowercase()),
            phone: Some(self.phone.clone()),
            occupation: Some(self.occupation.clone()),
            works_at: Some(self.works_at.clone()),
            bio: self.bio.clone(),
            photo_url: self.photo_url.clone(),
            role: UserRole::User,
            created_at: Some(now_millis()),
        }
    }
}

/// Flatten validator errors into one message.
pub(crate) fn describe(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}
