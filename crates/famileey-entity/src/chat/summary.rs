//! Unified chat list entries.

use serde::Serialize;

use famileey_core::types::id::UserId;

use super::message::LastMessage;
use crate::user::UserProfile;

/// Whether a list entry is a 1:1 thread or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Direct,
    Group,
}

/// A chat participant with the resolved profile, if it still exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantView {
    pub uid: UserId,
    #[serde(flatten)]
    pub profile: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One thread in the caller's chat list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    /// Chat id for direct threads, group id for groups.
    pub chat_id: String,
    pub kind: ChatKind,
    /// The other participant of a direct thread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_user: Option<UserId>,
    /// Group display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_broadcast_group: bool,
    pub participants: Vec<ParticipantView>,
    pub last_message: Option<LastMessage>,
    /// The caller's stored read time for direct threads.
    pub read_status: Option<i64>,
    pub has_read: bool,
}

impl ChatSummary {
    /// Timestamp used to order the list; threads without messages sort last.
    pub fn activity(&self) -> i64 {
        self.last_message.as_ref().map(|m| m.timestamp).unwrap_or(0)
    }
}
