//! Request DTOs.

use serde::Deserialize;
use serde_json::{Map, Value};

use famileey_entity::chat::MessageType;

/// Sign-in with an email address or phone number.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Email or phone.
    #[serde(alias = "email", alias = "phone")]
    pub login: String,
    pub password: String,
}

/// Profile update; only allow-listed keys are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub update_data: Map<String, Value>,
}

/// Query string of the family search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadPostRequest {
    pub story: String,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: String,
}

/// A direct message to another family.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub recipient_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "type")]
    pub message_type: MessageType,
}

/// Chat id lookup for a pair of users. `userA` defaults to the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPairRequest {
    #[serde(default, rename = "userA")]
    pub user_a: Option<String>,
    #[serde(rename = "userB")]
    pub user_b: String,
}

/// Message from the broadcast group's admin to every follower.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "type")]
    pub message_type: MessageType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessageRequest {
    pub group_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "type")]
    pub message_type: MessageType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub reply: String,
}

/// Device push token registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushTokenRequest {
    #[serde(alias = "token")]
    pub expo_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyAllRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeAdminRequest {
    pub user_id: String,
}
