//! Engagement annotation of posts: likes, comments, views, and score.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use futures::future::try_join_all;

use famileey_core::config::FeedConfig;
use famileey_core::result::AppResult;
use famileey_core::types::id::{PostId, UserId};
use famileey_database::repositories::{CommentRepository, LikeRepository, ViewRepository};
use famileey_entity::post::{Post, PostView};
use famileey_entity::user::ProfileView;

use crate::account::ProfileReader;

/// Builds [`PostView`]s for a viewer, scored with the configured weights.
#[derive(Debug, Clone)]
pub struct EngagementReader {
    likes: Arc<LikeRepository>,
    comments: Arc<CommentRepository>,
    views: Arc<ViewRepository>,
    profiles: ProfileReader,
    weights: FeedConfig,
}

impl EngagementReader {
    pub fn new(
        likes: Arc<LikeRepository>,
        comments: Arc<CommentRepository>,
        views: Arc<ViewRepository>,
        profiles: ProfileReader,
        weights: FeedConfig,
    ) -> Self {
        Self {
            likes,
            comments,
            views,
            profiles,
            weights,
        }
    }

    pub fn weights(&self) -> FeedConfig {
        self.weights
    }

    /// Annotates a single post.
    pub async fn annotate(&self, viewer: &UserId, id: PostId, post: Post) -> AppResult<PostView> {
        let (likers, comments, views, author) = tokio::try_join!(
            self.likes.likers(&id),
            self.comments.count(&id),
            self.views.count(&id),
            self.profiles.load(&post.uid),
        )?;
        Ok(self.build(viewer, id, post, &likers, comments, views, author))
    }

    /// Annotates many posts with one read per engagement table. Output keeps
    /// the input order.
    pub async fn annotate_all(
        &self,
        viewer: &UserId,
        posts: Vec<(PostId, Post)>,
    ) -> AppResult<Vec<PostView>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }
        let owners: BTreeSet<UserId> = posts.iter().map(|(_, p)| p.uid.clone()).collect();
        let (likers, comments, views, authors) = tokio::try_join!(
            self.likes.all_likers(),
            self.comments.all_counts(),
            self.views.all_counts(),
            try_join_all(owners.iter().map(|uid| self.profiles.load(uid))),
        )?;
        let authors: HashMap<&UserId, Option<ProfileView>> = owners.iter().zip(authors).collect();

        let empty = BTreeSet::new();
        Ok(posts
            .into_iter()
            .map(|(id, post)| {
                let post_likers = likers.get(&id).unwrap_or(&empty);
                let comment_count = comments.get(&id).copied().unwrap_or(0);
                let view_count = views.get(&id).copied().unwrap_or(0);
                let author = authors.get(&post.uid).cloned().flatten();
                self.build(viewer, id, post, post_likers, comment_count, view_count, author)
            })
            .collect())
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        viewer: &UserId,
        id: PostId,
        post: Post,
        likers: &BTreeSet<UserId>,
        comments: u64,
        views: u64,
        author: Option<ProfileView>,
    ) -> PostView {
        let likes = likers.len() as u64;
        PostView {
            post_id: id,
            post,
            user: author,
            likes,
            has_user_liked: likers.contains(viewer),
            comments_count: comments,
            views,
            score: self.weights.score(likes, comments, views),
        }
    }
}
