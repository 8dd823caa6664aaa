//! Notification record stored at `notifications/{uid}/{notificationId}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use famileey_core::types::id::{NotificationId, ReplyId, UserId};
use famileey_core::{AppError, AppResult};

use super::kind::NotificationKind;

/// The user who caused a notification, with their display name cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSender {
    pub uid: UserId,
    #[serde(default)]
    pub family_name: String,
}

/// A reply stored at `notifications/{uid}/{nid}/replies/{replyId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReply {
    pub reply_id: ReplyId,
    pub user_id: UserId,
    pub reply: String,
    pub timestamp: i64,
}

/// A notification in a user's log.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub from: NotificationSender,
    pub message: String,
    pub timestamp: i64,
    pub read: bool,
    pub rich_content: Option<Value>,
    pub replies: BTreeMap<ReplyId, NotificationReply>,
}

/// Stored shape of a notification; the id is the record's key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationRecord {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    from: NotificationSender,
    message: String,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rich_content: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    replies: BTreeMap<ReplyId, NotificationReply>,
}

impl Notification {
    /// The record written to the store.
    pub fn to_record(&self) -> AppResult<Value> {
        let (kind, data) = self.kind.clone().into_parts()?;
        let record = NotificationRecord {
            kind,
            data: Some(Value::Object(data)),
            from: self.from.clone(),
            message: self.message.clone(),
            timestamp: self.timestamp,
            read: self.read,
            rich_content: self.rich_content.clone(),
            replies: self.replies.clone(),
        };
        Ok(serde_json::to_value(record)?)
    }

    /// Parse a stored record. Fails with `Validation` on a record without a
    /// known type or message.
    pub fn from_record(id: NotificationId, value: Value) -> AppResult<Self> {
        let record: NotificationRecord = serde_json::from_value(value)
            .map_err(|e| AppError::validation(format!("Malformed notification '{id}': {e}")))?;
        if record.message.is_empty() {
            return Err(AppError::validation(format!(
                "Notification '{id}' has no message"
            )));
        }
        let kind = NotificationKind::from_parts(&record.kind, record.data)?;
        Ok(Self {
            id,
            kind,
            from: record.from,
            message: record.message,
            timestamp: record.timestamp,
            read: record.read,
            rich_content: record.rich_content,
            replies: record.replies,
        })
    }
}

impl Serialize for Notification {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (kind, data) = self
            .kind
            .clone()
            .into_parts()
            .map_err(serde::ser::Error::custom)?;
        let mut map = Map::new();
        map.insert("id".into(), Value::String(self.id.to_string()));
        map.insert("type".into(), Value::String(kind));
        map.insert("data".into(), Value::Object(data));
        map.insert(
            "from".into(),
            serde_json::to_value(&self.from).map_err(serde::ser::Error::custom)?,
        );
        map.insert("message".into(), Value::String(self.message.clone()));
        map.insert("timestamp".into(), Value::from(self.timestamp));
        map.insert("read".into(), Value::Bool(self.read));
        map.insert(
            "richContent".into(),
            self.rich_content.clone().unwrap_or(Value::Null),
        );
        if !self.replies.is_empty() {
            map.insert(
                "replies".into(),
                serde_json::to_value(&self.replies).map_err(serde::ser::Error::custom)?,
            );
        }
        Value::Object(map).serialize(serializer)
    }
}
