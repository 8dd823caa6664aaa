//! Stored post records.

use serde::{Deserialize, Serialize};

use famileey_core::types::id::{PostId, UserId};

/// A post stored at `posts/{postId}`. Immutable after upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Owner of the post.
    pub uid: UserId,
    /// Text or caption.
    #[serde(default)]
    pub story: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Server-assigned creation time in epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

/// A like stored at `likes/{postId}/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub postid: PostId,
    pub uid: UserId,
    #[serde(default)]
    pub timestamp: i64,
}

/// A comment stored at `comments/{postId}/{commentId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub uid: UserId,
    pub comment: String,
    pub postid: PostId,
    #[serde(default)]
    pub timestamp: i64,
}

/// View counter stored at `postViews/{postId}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCounter {
    #[serde(default)]
    pub count: u64,
}
