//! Push delivery trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::AppResult;

/// One push message addressed to a device token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_content: Option<Value>,
}

/// Delivery ticket returned by the push service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushTicket {
    /// `"ok"` or `"error"`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PushTicket {
    /// Whether the push service accepted the message.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Fire-and-forget push delivery sink.
#[async_trait]
pub trait PushSender: Send + Sync + std::fmt::Debug + 'static {
    /// Whether `token` has a shape the push service accepts.
    fn is_valid_token(&self, token: &str) -> bool;

    /// Deliver one message. Malformed tokens fail with `Validation` before
    /// any network call.
    async fn send(&self, message: PushMessage) -> AppResult<PushTicket>;
}
