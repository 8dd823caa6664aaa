//! Views assembled by the feed engine.

use serde::Serialize;

use famileey_core::types::id::{CommentId, PostId, UserId};

use super::model::{Comment, Post};
use crate::user::{ProfileView, UserProfile};

/// A post annotated with its author and engagement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub post_id: PostId,
    #[serde(flatten)]
    pub post: Post,
    /// Author profile; absent when the author record is gone.
    pub user: Option<ProfileView>,
    pub likes: u64,
    /// Whether the requesting caller liked the post.
    pub has_user_liked: bool,
    pub comments_count: u64,
    pub views: u64,
    /// Weighted relevance score.
    pub score: f64,
}

/// One entry of the ranked family list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilySummary {
    pub uid: UserId,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub total_posts: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    /// `total_likes + total_comments`.
    pub total_engagement: u64,
    /// Whether the caller follows this family.
    pub is_following: bool,
}

/// A comment with its author.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub comment_id: CommentId,
    #[serde(flatten)]
    pub comment: Comment,
    pub user: Option<ProfileView>,
}
