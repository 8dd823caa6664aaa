//! Family rankings, family post feeds, search, and view counting.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::types::id::{PostId, UserId};
use famileey_database::repositories::{
    CommentRepository, FollowRepository, LikeRepository, PostRepository, UserRepository,
    ViewRepository,
};
use famileey_entity::post::{FamilySummary, PostView};
use famileey_entity::user::UserListing;

use crate::context::RequestContext;
use crate::post::EngagementReader;

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    posts: u64,
    likes: u64,
    comments: u64,
}

/// Read-side of the family network.
#[derive(Debug, Clone)]
pub struct FeedService {
    users: Arc<UserRepository>,
    posts: Arc<PostRepository>,
    likes: Arc<LikeRepository>,
    comments: Arc<CommentRepository>,
    views: Arc<ViewRepository>,
    follows: Arc<FollowRepository>,
    engagement: EngagementReader,
}

impl FeedService {
    pub fn new(
        users: Arc<UserRepository>,
        posts: Arc<PostRepository>,
        likes: Arc<LikeRepository>,
        comments: Arc<CommentRepository>,
        views: Arc<ViewRepository>,
        follows: Arc<FollowRepository>,
        engagement: EngagementReader,
    ) -> Self {
        Self {
            users,
            posts,
            likes,
            comments,
            views,
            follows,
            engagement,
        }
    }

    /// Every other family ranked by total engagement (likes plus comments
    /// on their posts), highest first. Ties are ordered by user id.
    pub async fn get_families(&self, ctx: &RequestContext) -> AppResult<Vec<FamilySummary>> {
        let (users, posts, likers, comment_counts, following) = tokio::try_join!(
            self.users.find_all(),
            self.posts.find_all(),
            self.likes.all_likers(),
            self.comments.all_counts(),
            self.follows.following(&ctx.user_id),
        )?;

        let mut totals: HashMap<UserId, Totals> = HashMap::new();
        for (id, post) in &posts {
            let entry = totals.entry(post.uid.clone()).or_default();
            entry.posts += 1;
            entry.likes += likers.get(id).map_or(0, |set| set.len() as u64);
            entry.comments += comment_counts.get(id).copied().unwrap_or(0);
        }

        let mut families: Vec<FamilySummary> = users
            .into_iter()
            .filter(|(uid, _)| !ctx.is(uid))
            .map(|(uid, profile)| {
                let t = totals.get(&uid).copied().unwrap_or_default();
                FamilySummary {
                    is_following: following.contains(&uid),
                    uid,
                    profile,
                    total_posts: t.posts,
                    total_likes: t.likes,
                    total_comments: t.comments,
                    total_engagement: t.likes + t.comments,
                }
            })
            .collect();
        families.sort_by(|a, b| {
            b.total_engagement
                .cmp(&a.total_engagement)
                .then_with(|| a.uid.cmp(&b.uid))
        });
        debug!(uid = %ctx.user_id, count = families.len(), "Families ranked");
        Ok(families)
    }

    /// Posts of `uid` ranked by relevance score, highest first.
    pub async fn get_family_posts(
        &self,
        ctx: &RequestContext,
        uid: &UserId,
    ) -> AppResult<Vec<PostView>> {
        if !self.users.exists(uid).await? {
            return Err(AppError::not_found(format!("User '{uid}' not found")));
        }
        let posts = self.posts.find_by_owner(uid).await?;
        let mut views = self.engagement.annotate_all(&ctx.user_id, posts).await?;
        views.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.post.timestamp.cmp(&a.post.timestamp))
        });
        Ok(views)
    }

    /// Families whose name contains `query`, ignoring case. An empty query
    /// matches everyone.
    pub async fn search_families(&self, query: &str) -> AppResult<Vec<UserListing>> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .users
            .find_all()
            .await?
            .into_iter()
            .filter(|(_, profile)| {
                needle.is_empty() || profile.family_name.to_lowercase().contains(&needle)
            })
            .map(|(id, profile)| UserListing { id, profile })
            .collect())
    }

    /// Counts one view of a post and returns the new total.
    pub async fn record_post_view(&self, post: &PostId) -> AppResult<u64> {
        if self.posts.find_by_id(post).await?.is_none() {
            return Err(AppError::not_found("Post does not exist"));
        }
        self.views.increment(post).await
    }
}
