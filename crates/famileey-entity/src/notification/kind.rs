//! Tagged notification payloads.
//!
//! Each variant carries only the fields its type uses. On the wire the tag
//! is the `type` field and the payload is the `data` object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use famileey_core::types::id::{ChatId, CommentId, GroupId, MessageId, NotificationId, PostId, ReplyId};
use famileey_core::{AppError, AppResult};

/// What a notification is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum NotificationKind {
    #[serde(rename_all = "camelCase")]
    Like { post_id: PostId },
    #[serde(rename_all = "camelCase")]
    Comment { post_id: PostId, comment_id: CommentId },
    FollowRequest {},
    FollowAccepted {},
    FollowConfirmed {},
    FollowDeclined {},
    #[serde(rename_all = "camelCase")]
    Message { chat_id: ChatId, message_id: MessageId },
    #[serde(rename_all = "camelCase")]
    Broadcast { group_id: GroupId, message_id: MessageId },
    #[serde(rename_all = "camelCase")]
    NotificationReply {
        notification_id: NotificationId,
        reply_id: ReplyId,
    },
    AdminBroadcast { title: String },
}

impl NotificationKind {
    /// The `type` tag written to the store.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Like { .. } => "like",
            Self::Comment { .. } => "comment",
            Self::FollowRequest {} => "follow-request",
            Self::FollowAccepted {} => "follow-accepted",
            Self::FollowConfirmed {} => "follow-confirmed",
            Self::FollowDeclined {} => "follow-declined",
            Self::Message { .. } => "message",
            Self::Broadcast { .. } => "broadcast",
            Self::NotificationReply { .. } => "notification-reply",
            Self::AdminBroadcast { .. } => "admin-broadcast",
        }
    }

    /// Split into the stored `type` tag and `data` object.
    pub fn into_parts(self) -> AppResult<(String, Map<String, Value>)> {
        let tag = self.type_tag().to_string();
        let data = match serde_json::to_value(&self)? {
            Value::Object(mut obj) => match obj.remove("data") {
                Some(Value::Object(data)) => data,
                _ => Map::new(),
            },
            _ => Map::new(),
        };
        Ok((tag, data))
    }

    /// Rebuild from a stored `type` tag and `data` value. A missing `data`
    /// reads as an empty object, since the store drops empty objects.
    pub fn from_parts(tag: &str, data: Option<Value>) -> AppResult<Self> {
        let data = match data {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(other) => other,
        };
        let mut tagged = Map::new();
        tagged.insert("type".to_string(), Value::String(tag.to_string()));
        tagged.insert("data".to_string(), data);
        serde_json::from_value(Value::Object(tagged)).map_err(|e| {
            AppError::validation(format!("Malformed '{tag}' notification payload: {e}"))
        })
    }

    /// Push payload: the `type` tag merged into the data fields.
    pub fn push_data(&self) -> AppResult<Value> {
        let (tag, mut data) = self.clone().into_parts()?;
        data.insert("type".to_string(), Value::String(tag));
        Ok(Value::Object(data))
    }
}
