//! Chat thread records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use famileey_core::types::id::{MessageId, UserId};

use super::message::{ChatMessage, LastMessage};

/// A 1:1 chat stored at `chats/{chatId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectChat {
    #[serde(default)]
    pub participants: BTreeMap<UserId, bool>,
    #[serde(default)]
    pub created_at: i64,
    /// Last read time per participant.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub read_status: BTreeMap<UserId, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<LastMessage>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub messages: BTreeMap<MessageId, ChatMessage>,
}

impl DirectChat {
    pub fn participant_ids(&self) -> impl Iterator<Item = &UserId> {
        self.participants
            .iter()
            .filter(|(_, present)| **present)
            .map(|(uid, _)| uid)
    }

    /// Whether `uid` has read up to the newest message. A thread with no
    /// messages counts as read.
    pub fn has_read(&self, uid: &UserId) -> bool {
        match &self.last_message {
            None => true,
            Some(last) => {
                if last.is_read_by(uid) {
                    return true;
                }
                self.read_status
                    .get(uid)
                    .is_some_and(|read_at| *read_at >= last.timestamp)
            }
        }
    }
}

/// A group chat stored at `groupChats/{groupId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupChat {
    #[serde(default)]
    pub name: String,
    pub admin_id: UserId,
    #[serde(default)]
    pub participants: BTreeMap<UserId, bool>,
    #[serde(default)]
    pub is_broadcast_group: bool,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<LastMessage>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub messages: BTreeMap<MessageId, ChatMessage>,
}

impl GroupChat {
    pub fn is_participant(&self, uid: &UserId) -> bool {
        self.participants.get(uid).copied().unwrap_or(false)
    }

    pub fn participant_ids(&self) -> impl Iterator<Item = &UserId> {
        self.participants
            .iter()
            .filter(|(_, present)| **present)
            .map(|(uid, _)| uid)
    }

    /// Whether `uid` has seen the newest message.
    pub fn has_read(&self, uid: &UserId) -> bool {
        self.last_message
            .as_ref()
            .map(|last| last.is_read_by(uid))
            .unwrap_or(true)
    }
}
