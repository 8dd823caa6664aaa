//! Administrative operations: broadcast notifications and role promotion.

use std::sync::Arc;

use futures::future::join_all;
use tracing::info;

use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::types::id::UserId;
use famileey_database::repositories::UserRepository;
use famileey_entity::notification::NotificationKind;
use famileey_entity::user::UserRole;

use crate::context::RequestContext;
use crate::notification::NotificationService;

#[derive(Debug, Clone)]
pub struct AdminService {
    users: Arc<UserRepository>,
    notifications: NotificationService,
}

impl AdminService {
    pub fn new(users: Arc<UserRepository>, notifications: NotificationService) -> Self {
        Self {
            users,
            notifications,
        }
    }

    async fn require_admin(&self, ctx: &RequestContext) -> AppResult<()> {
        let is_admin = self
            .users
            .find_by_id(&ctx.user_id)
            .await?
            .is_some_and(|profile| profile.is_admin());
        if !is_admin {
            return Err(AppError::forbidden("Admin access required"));
        }
        Ok(())
    }

    /// Sends an `admin-broadcast` notification to every user except the
    /// caller. Returns the number of recipients.
    pub async fn notify_all(
        &self,
        ctx: &RequestContext,
        title: &str,
        message: &str,
    ) -> AppResult<usize> {
        self.require_admin(ctx).await?;
        let (title, message) = (title.trim(), message.trim());
        if title.is_empty() || message.is_empty() {
            return Err(AppError::validation("Title and message are required"));
        }

        let recipients: Vec<UserId> = self
            .users
            .find_all()
            .await?
            .into_iter()
            .map(|(uid, _)| uid)
            .filter(|uid| !ctx.is(uid))
            .collect();
        let deliveries = recipients.iter().map(|uid| {
            let body = message.to_string();
            self.notifications.notify_best_effort(
                uid,
                &ctx.user_id,
                NotificationKind::AdminBroadcast {
                    title: title.to_string(),
                },
                move |_| body,
            )
        });
        let delivered = join_all(deliveries).await.into_iter().flatten().count();
        info!(admin = %ctx.user_id, recipients = recipients.len(), delivered, "Admin broadcast sent");
        Ok(delivered)
    }

    /// Promotes `target` to admin.
    pub async fn make_admin(&self, ctx: &RequestContext, target: &UserId) -> AppResult<()> {
        self.require_admin(ctx).await?;
        if !self.users.exists(target).await? {
            return Err(AppError::not_found(format!("User '{target}' not found")));
        }
        self.users.set_role(target, UserRole::Admin).await?;
        info!(admin = %ctx.user_id, target = %target, "User promoted to admin");
        Ok(())
    }
}
