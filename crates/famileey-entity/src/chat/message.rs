//! Chat message records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use famileey_core::types::id::{MessageId, UserId};

/// Content type of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// Delivery status recorded on a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    Sent,
    Delivered,
    Read,
}

/// A message stored at `chats/{chatId}/messages/{messageId}` or
/// `groupChats/{groupId}/messages/{messageId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender_id: UserId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub status: MessageStatus,
    /// Read time per recipient in epoch milliseconds.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub read_status: BTreeMap<UserId, i64>,
}

/// A message together with its identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageEntry {
    pub id: MessageId,
    #[serde(flatten)]
    pub message: ChatMessage,
}

/// Summary of the newest message of a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub read_status: BTreeMap<UserId, i64>,
}

impl LastMessage {
    /// Whether `uid` has seen this message, either by sending it or by a
    /// read stamp on it.
    pub fn is_read_by(&self, uid: &UserId) -> bool {
        self.sender_id.as_ref() == Some(uid) || self.read_status.contains_key(uid)
    }
}
