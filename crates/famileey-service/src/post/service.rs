//! Post upload, likes, and comments.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::info;

use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::types::id::{CommentId, PostId, UserId};
use famileey_core::types::time::now_millis;
use famileey_database::repositories::{CommentRepository, LikeRepository, PostRepository};
use famileey_entity::notification::NotificationKind;
use famileey_entity::post::{Comment, CommentView, Like, Post, PostView};
use famileey_entity::user::ProfileView;

use super::engagement::EngagementReader;
use crate::account::ProfileReader;
use crate::context::RequestContext;
use crate::notification::NotificationService;

/// Post content shared by a family.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub story: String,
    pub photo_url: Option<String>,
}

/// Manages posts and their likes and comments.
#[derive(Debug, Clone)]
pub struct PostService {
    posts: Arc<PostRepository>,
    likes: Arc<LikeRepository>,
    comments: Arc<CommentRepository>,
    profiles: ProfileReader,
    engagement: EngagementReader,
    notifications: NotificationService,
}

impl PostService {
    pub fn new(
        posts: Arc<PostRepository>,
        likes: Arc<LikeRepository>,
        comments: Arc<CommentRepository>,
        profiles: ProfileReader,
        engagement: EngagementReader,
        notifications: NotificationService,
    ) -> Self {
        Self {
            posts,
            likes,
            comments,
            profiles,
            engagement,
            notifications,
        }
    }

    async fn require_post(&self, id: &PostId) -> AppResult<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Post does not exist"))
    }

    /// Every post, newest first, annotated for the caller.
    pub async fn list_posts(&self, ctx: &RequestContext) -> AppResult<Vec<PostView>> {
        let mut posts = self.posts.find_all().await?;
        posts.reverse();
        self.engagement.annotate_all(&ctx.user_id, posts).await
    }

    pub async fn get_post(&self, ctx: &RequestContext, id: &PostId) -> AppResult<PostView> {
        let post = self.require_post(id).await?;
        self.engagement.annotate(&ctx.user_id, id.clone(), post).await
    }

    /// Stores a post owned by the caller with a server timestamp.
    pub async fn upload(&self, ctx: &RequestContext, new_post: NewPost) -> AppResult<PostId> {
        let story = new_post.story.trim().to_string();
        let photo_url = new_post.photo_url.filter(|url| !url.trim().is_empty());
        if story.is_empty() && photo_url.is_none() {
            return Err(AppError::validation("A post needs a story or a photo"));
        }
        if self.profiles.profile(&ctx.user_id).await?.is_none() {
            return Err(AppError::not_found("User does not exist"));
        }

        let id = self
            .posts
            .create(&Post {
                uid: ctx.user_id.clone(),
                story,
                photo_url,
                timestamp: now_millis(),
            })
            .await?;
        info!(uid = %ctx.user_id, post_id = %id, "Post uploaded");
        Ok(id)
    }

    /// Likes a post once. The owner hears about it unless they liked their
    /// own post.
    pub async fn like(&self, ctx: &RequestContext, id: &PostId) -> AppResult<()> {
        let post = self.require_post(id).await?;
        if self.likes.exists(id, &ctx.user_id).await? {
            return Err(AppError::conflict("Post already liked"));
        }
        self.likes
            .like(&Like {
                postid: id.clone(),
                uid: ctx.user_id.clone(),
                timestamp: now_millis(),
            })
            .await?;

        if !ctx.is(&post.uid) {
            self.notifications
                .notify_best_effort(
                    &post.uid,
                    &ctx.user_id,
                    NotificationKind::Like { post_id: id.clone() },
                    |p| format!("{} liked your post", p.family_name),
                )
                .await;
        }
        Ok(())
    }

    pub async fn unlike(&self, ctx: &RequestContext, id: &PostId) -> AppResult<()> {
        self.require_post(id).await?;
        if !self.likes.exists(id, &ctx.user_id).await? {
            return Err(AppError::not_found("User has not liked this post"));
        }
        self.likes.unlike(id, &ctx.user_id).await
    }

    /// Like records of a post, oldest first.
    pub async fn likes(&self, id: &PostId) -> AppResult<Vec<Like>> {
        self.require_post(id).await?;
        self.likes.list(id).await
    }

    pub async fn add_comment(
        &self,
        ctx: &RequestContext,
        id: &PostId,
        text: &str,
    ) -> AppResult<CommentId> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("Comment must not be empty"));
        }
        let post = self.require_post(id).await?;
        let comment_id = self
            .comments
            .create(&Comment {
                uid: ctx.user_id.clone(),
                comment: text.to_string(),
                postid: id.clone(),
                timestamp: now_millis(),
            })
            .await?;

        if !ctx.is(&post.uid) {
            let excerpt = text.to_string();
            self.notifications
                .notify_best_effort(
                    &post.uid,
                    &ctx.user_id,
                    NotificationKind::Comment {
                        post_id: id.clone(),
                        comment_id: comment_id.clone(),
                    },
                    move |p| format!("{} commented on your post: {excerpt}", p.family_name),
                )
                .await;
        }
        Ok(comment_id)
    }

    /// Only the comment's author or the post's owner may delete it.
    pub async fn delete_comment(
        &self,
        ctx: &RequestContext,
        post_id: &PostId,
        comment_id: &CommentId,
    ) -> AppResult<()> {
        let post = self.require_post(post_id).await?;
        let comment = self
            .comments
            .find(post_id, comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment does not exist"))?;
        if !ctx.is(&comment.uid) && !ctx.is(&post.uid) {
            return Err(AppError::forbidden(
                "Only the author or the post owner can delete this comment",
            ));
        }
        self.comments.remove(post_id, comment_id).await
    }

    /// Comments of a post with their authors, newest first.
    pub async fn comments(&self, id: &PostId) -> AppResult<Vec<CommentView>> {
        self.require_post(id).await?;
        let mut comments = self.comments.list(id).await?;
        comments.reverse();

        let authors: BTreeSet<UserId> = comments.iter().map(|(_, c)| c.uid.clone()).collect();
        let profiles = try_join_all(authors.iter().map(|uid| self.profiles.load(uid))).await?;
        let profiles: HashMap<&UserId, Option<ProfileView>> = authors.iter().zip(profiles).collect();

        Ok(comments
            .into_iter()
            .map(|(comment_id, comment)| CommentView {
                user: profiles.get(&comment.uid).cloned().flatten(),
                comment_id,
                comment,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use famileey_core::error::ErrorKind;

    fn story(text: &str) -> NewPost {
        NewPost {
            story: text.into(),
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn test_like_notifies_owner_once() {
        let h = Harness::new().await;
        let (owner, fan) = (h.user("u1", "Achebe").await, h.user("u2", "Banda").await);
        let post = h
            .posts
            .upload(&RequestContext::for_user(owner.clone()), story("Harvest"))
            .await
            .unwrap();

        let ctx = RequestContext::for_user(fan.clone());
        h.posts.like(&ctx, &post).await.unwrap();
        let err = h.posts.like(&ctx, &post).await.unwrap_err();
        assert!(err.is(ErrorKind::Conflict));

        let view = h.posts.get_post(&ctx, &post).await.unwrap();
        assert_eq!(view.likes, 1);
        assert!(view.has_user_liked);

        let inbox = h
            .notifications
            .list(&RequestContext::for_user(owner))
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationKind::Like { post_id: post });
        assert_eq!(inbox[0].message, "Banda liked your post");
    }

    #[tokio::test]
    async fn test_self_like_sends_no_notification() {
        let h = Harness::new().await;
        let owner = h.user("u1", "Achebe").await;
        let ctx = RequestContext::for_user(owner);
        let post = h.posts.upload(&ctx, story("Harvest")).await.unwrap();
        h.posts.like(&ctx, &post).await.unwrap();
        assert!(h.notifications.list(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unlike_without_like_is_not_found() {
        let h = Harness::new().await;
        let owner = h.user("u1", "Achebe").await;
        let ctx = RequestContext::for_user(owner);
        let post = h.posts.upload(&ctx, story("Harvest")).await.unwrap();
        let err = h.posts.unlike(&ctx, &post).await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_upload_requires_content() {
        let h = Harness::new().await;
        let ctx = RequestContext::for_user(h.user("u1", "Achebe").await);
        let err = h.posts.upload(&ctx, story("   ")).await.unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_delete_comment_permissions() {
        let h = Harness::new().await;
        let owner = RequestContext::for_user(h.user("u1", "Achebe").await);
        let author = RequestContext::for_user(h.user("u2", "Banda").await);
        let stranger = RequestContext::for_user(h.user("u3", "Chege").await);
        let post = h.posts.upload(&owner, story("Harvest")).await.unwrap();

        let first = h.posts.add_comment(&author, &post, "lovely").await.unwrap();
        let second = h.posts.add_comment(&author, &post, "again").await.unwrap();

        let err = h
            .posts
            .delete_comment(&stranger, &post, &first)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Forbidden));

        h.posts.delete_comment(&author, &post, &first).await.unwrap();
        h.posts.delete_comment(&owner, &post, &second).await.unwrap();
        assert!(h.posts.comments(&post).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comments_carry_author_profiles() {
        let h = Harness::new().await;
        let owner = RequestContext::for_user(h.user("u1", "Achebe").await);
        let author = RequestContext::for_user(h.user("u2", "Banda").await);
        let post = h.posts.upload(&owner, story("Harvest")).await.unwrap();
        h.posts.add_comment(&author, &post, "hi").await.unwrap();

        let comments = h.posts.comments(&post).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].comment.comment, "hi");
        assert_eq!(
            comments[0].user.as_ref().map(|u| u.profile.family_name.as_str()),
            Some("Banda")
        );
    }
}
