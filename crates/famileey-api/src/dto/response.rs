//! Response DTOs.
//!
//! Every success body is `{ "success": true, "message"?: ..., <payload> }`;
//! the payload struct is flattened into the envelope.

use serde::Serialize;

use famileey_core::types::id::{
    ChatId, CommentId, GroupId, MessageId, NotificationId, PostId, ReplyId, UserId,
};
use famileey_entity::chat::{ChatSummary, GroupChat, MessageEntry};
use famileey_entity::notification::Notification;
use famileey_entity::post::{CommentView, FamilySummary, Like, PostView};
use famileey_entity::user::{ProfileView, UserListing};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response payload, flattened.
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

impl ApiResponse<Empty> {
    /// A success carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_message(message, Empty {})
    }
}

/// No payload.
#[derive(Debug, Clone, Serialize)]
pub struct Empty {}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub uid: UserId,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user: ProfileView,
}

#[derive(Debug, Clone, Serialize)]
pub struct FamiliesResponse {
    pub families: Vec<FamilySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserListing>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostsResponse {
    pub posts: Vec<PostView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub post: PostView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCreatedResponse {
    pub post_id: PostId,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewCountResponse {
    pub views: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikesResponse {
    pub likes: Vec<Like>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreatedResponse {
    pub comment_id: CommentId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessageResponse {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatIdResponse {
    pub chat_id: ChatId,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatsResponse {
    pub chats: Vec<ChatSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResponse {
    pub read_at: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub group_id: GroupId,
    pub group: GroupChat,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessageResponse {
    pub group_id: GroupId,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastResponse {
    pub group_id: GroupId,
    pub message_id: MessageId,
    pub recipients: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationIdResponse {
    pub notification_id: NotificationId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyResponse {
    pub reply_id: ReplyId,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `"reachable"` or `"unreachable"`.
    pub store: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_flattens_payload() {
        let body = serde_json::to_value(ApiResponse::with_message(
            "Post uploaded",
            PostCreatedResponse {
                post_id: PostId::from("p1"),
            },
        ))
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "success": true, "message": "Post uploaded", "postId": "p1" })
        );

        let body = serde_json::to_value(ApiResponse::message("done")).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "message": "done" }));
    }
}
