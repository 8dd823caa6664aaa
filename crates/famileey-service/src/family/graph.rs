//! Follow edges and the request, accept, decline, and cancel workflow.
//!
//! Per ordered pair (A, B) the state moves `none -> requested -> following`
//! through the gated path, or `none -> following` directly through
//! [`GraphService::follow`]. Every transition that touches more than one
//! location is a single multi-path update.

use std::sync::Arc;

use tracing::info;

use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::UserId;
use famileey_core::types::update::MultiPathUpdate;
use famileey_database::StoreManager;
use famileey_database::repositories::{FollowRepository, FollowRequestRepository, UserRepository};
use famileey_entity::notification::NotificationKind;

use crate::context::RequestContext;
use crate::notification::NotificationService;

/// Manages who follows whom.
#[derive(Debug, Clone)]
pub struct GraphService {
    store: StoreManager,
    users: Arc<UserRepository>,
    follows: Arc<FollowRepository>,
    requests: Arc<FollowRequestRepository>,
    notifications: NotificationService,
}

impl GraphService {
    pub fn new(
        store: StoreManager,
        users: Arc<UserRepository>,
        follows: Arc<FollowRepository>,
        requests: Arc<FollowRequestRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            store,
            users,
            follows,
            requests,
            notifications,
        }
    }

    async fn require_other(&self, ctx: &RequestContext, target: &UserId) -> AppResult<()> {
        if ctx.is(target) {
            return Err(AppError::validation("You cannot follow yourself"));
        }
        if !self.users.exists(target).await? {
            return Err(AppError::not_found(format!("User '{target}' not found")));
        }
        Ok(())
    }

    /// Follows `target` without a request step. A pending request between
    /// the pair is cleared in the same update.
    pub async fn follow(&self, ctx: &RequestContext, target: &UserId) -> AppResult<()> {
        self.require_other(ctx, target).await?;
        let mut update = MultiPathUpdate::new();
        FollowRepository::stage_follow(&mut update, &ctx.user_id, target);
        FollowRequestRepository::stage_remove(&mut update, target, &ctx.user_id);
        self.store.update(update).await?;
        info!(follower = %ctx.user_id, followee = %target, "Family followed");
        Ok(())
    }

    pub async fn unfollow(&self, ctx: &RequestContext, target: &UserId) -> AppResult<()> {
        if ctx.is(target) {
            return Err(AppError::validation("You cannot unfollow yourself"));
        }
        self.follows.unfollow(&ctx.user_id, target).await?;
        info!(follower = %ctx.user_id, followee = %target, "Family unfollowed");
        Ok(())
    }

    /// Asks `target` for permission to follow them.
    pub async fn request_follow(&self, ctx: &RequestContext, target: &UserId) -> AppResult<()> {
        self.require_other(ctx, target).await?;
        let (following, pending) = tokio::try_join!(
            self.follows.is_following(&ctx.user_id, target),
            self.requests.exists(target, &ctx.user_id),
        )?;
        if following {
            return Err(AppError::conflict("You already follow this family"));
        }
        if pending {
            return Err(AppError::conflict("Follow request already sent"));
        }

        self.requests.create(target, &ctx.user_id).await?;
        info!(requester = %ctx.user_id, target = %target, "Follow requested");

        self.notifications
            .notify_best_effort(
                target,
                &ctx.user_id,
                NotificationKind::FollowRequest {},
                |p| format!("{} wants to follow you", p.family_name),
            )
            .await;
        Ok(())
    }

    /// The caller accepts `requester`'s pending request.
    ///
    /// The follow edge, the request deletion, and the removal of the request
    /// notification land in one update. Both sides are then notified.
    pub async fn accept_follow(&self, ctx: &RequestContext, requester: &UserId) -> AppResult<()> {
        let target = &ctx.user_id;
        if !self.requests.exists(target, requester).await? {
            return Err(AppError::not_found("Follow request not found"));
        }

        let mut update = MultiPathUpdate::new();
        FollowRepository::stage_follow(&mut update, requester, target);
        FollowRequestRepository::stage_remove(&mut update, target, requester);
        self.notifications
            .stage_remove_follow_request_notifications(&mut update, target, requester)
            .await?;
        self.store.update(update).await?;
        info!(requester = %requester, target = %target, "Follow request accepted");

        self.notifications
            .notify_best_effort(
                requester,
                target,
                NotificationKind::FollowAccepted {},
                |p| format!("{} accepted your follow request", p.family_name),
            )
            .await;
        self.notifications
            .notify_best_effort(
                target,
                requester,
                NotificationKind::FollowConfirmed {},
                |p| format!("{} is now following you", p.family_name),
            )
            .await;
        Ok(())
    }

    /// The caller turns down `requester`'s pending request.
    pub async fn decline_follow(&self, ctx: &RequestContext, requester: &UserId) -> AppResult<()> {
        let target = &ctx.user_id;
        if !self.requests.exists(target, requester).await? {
            return Err(AppError::not_found("Follow request not found"));
        }

        let mut update = MultiPathUpdate::new();
        FollowRequestRepository::stage_remove(&mut update, target, requester);
        self.notifications
            .stage_remove_follow_request_notifications(&mut update, target, requester)
            .await?;
        self.store.update(update).await?;
        info!(requester = %requester, target = %target, "Follow request declined");

        self.notifications
            .notify_best_effort(
                requester,
                target,
                NotificationKind::FollowDeclined {},
                |p| format!("{} declined your follow request", p.family_name),
            )
            .await;
        Ok(())
    }

    /// The caller withdraws their pending request to `target`.
    pub async fn cancel_follow(&self, ctx: &RequestContext, target: &UserId) -> AppResult<()> {
        let requester = &ctx.user_id;
        if !self.requests.exists(target, requester).await? {
            return Err(AppError::not_found("Follow request not found"));
        }

        let mut update = MultiPathUpdate::new();
        FollowRequestRepository::stage_remove(&mut update, target, requester);
        self.notifications
            .stage_remove_follow_request_notifications(&mut update, target, requester)
            .await?;
        self.store.update(update).await?;
        info!(requester = %requester, target = %target, "Follow request cancelled");
        Ok(())
    }
}
