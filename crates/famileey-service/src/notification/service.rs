//! Notification fan-out and the per-user notification log.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::traits::push::{PushMessage, PushSender};
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::{NotificationId, ReplyId, UserId};
use famileey_core::types::time::now_millis;
use famileey_core::types::update::MultiPathUpdate;
use famileey_database::StoreManager;
use famileey_database::repositories::{NotificationRepository, PushTokenRepository, UserRepository};
use famileey_entity::notification::{
    Notification, NotificationKind, NotificationReply, NotificationSender,
};
use famileey_entity::user::UserProfile;

use crate::context::RequestContext;

/// Writes notifications into user logs and pushes them to devices.
#[derive(Debug, Clone)]
pub struct NotificationService {
    store: StoreManager,
    notifications: Arc<NotificationRepository>,
    users: Arc<UserRepository>,
    tokens: Arc<PushTokenRepository>,
    push: Arc<dyn PushSender>,
    push_title: String,
}

impl NotificationService {
    pub fn new(
        store: StoreManager,
        notifications: Arc<NotificationRepository>,
        users: Arc<UserRepository>,
        tokens: Arc<PushTokenRepository>,
        push: Arc<dyn PushSender>,
        push_title: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifications,
            users,
            tokens,
            push,
            push_title: push_title.into(),
        }
    }

    /// Records a notification for `target` caused by `from`, then pushes it
    /// to the target's device if a token is registered.
    ///
    /// `message` receives the sender's profile so the text can name them.
    /// The record counts as created whatever the push outcome.
    pub async fn notify<F>(
        &self,
        target: &UserId,
        from: &UserId,
        kind: NotificationKind,
        message: F,
    ) -> AppResult<NotificationId>
    where
        F: FnOnce(&UserProfile) -> String + Send,
    {
        let sender = self
            .users
            .find_by_id(from)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{from}' not found")))?;

        let notification = Notification {
            id: NotificationId::new(),
            message: message(&sender),
            rich_content: sender
                .photo_url
                .as_ref()
                .filter(|url| !url.is_empty())
                .map(|url| json!({ "image": url })),
            from: NotificationSender {
                uid: from.clone(),
                family_name: sender.family_name,
            },
            kind,
            timestamp: now_millis(),
            read: false,
            replies: BTreeMap::new(),
        };
        self.notifications.insert(target, &notification).await?;
        debug!(
            target = %target,
            from = %from,
            kind = notification.kind.type_tag(),
            "Notification recorded"
        );

        self.push_best_effort(target, &notification).await;
        Ok(notification.id)
    }

    /// [`notify`](Self::notify) for side effects of another operation:
    /// failures are logged and swallowed.
    pub async fn notify_best_effort<F>(
        &self,
        target: &UserId,
        from: &UserId,
        kind: NotificationKind,
        message: F,
    ) -> Option<NotificationId>
    where
        F: FnOnce(&UserProfile) -> String + Send,
    {
        let tag = kind.type_tag();
        match self.notify(target, from, kind, message).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(target = %target, from = %from, kind = tag, error = %e, "Failed to record notification");
                None
            }
        }
    }

    async fn push_best_effort(&self, target: &UserId, notification: &Notification) {
        let token = match self.tokens.find(target).await {
            Ok(Some(token)) => token,
            Ok(None) => return,
            Err(e) => {
                warn!(target = %target, error = %e, "Failed to look up push token");
                return;
            }
        };
        let data = match notification.kind.push_data() {
            Ok(data) => data,
            Err(e) => {
                warn!(target = %target, error = %e, "Failed to build push payload");
                return;
            }
        };
        let message = PushMessage {
            to: token,
            title: self.push_title.clone(),
            body: notification.message.clone(),
            data,
            rich_content: notification.rich_content.clone(),
        };
        match self.push.send(message).await {
            Ok(ticket) if ticket.is_ok() => {}
            Ok(ticket) => {
                warn!(target = %target, message = ?ticket.message, "Push delivery rejected")
            }
            Err(e) => warn!(target = %target, error = %e, "Push delivery failed"),
        }
    }

    /// The caller's notifications, newest first.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<Notification>> {
        let mut notifications = self.notifications.list(&ctx.user_id).await?;
        notifications.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(notifications)
    }

    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<usize> {
        Ok(self
            .notifications
            .list(&ctx.user_id)
            .await?
            .iter()
            .filter(|n| !n.read)
            .count())
    }

    pub async fn mark_read(&self, ctx: &RequestContext, id: &NotificationId) -> AppResult<()> {
        if self.notifications.find(&ctx.user_id, id).await?.is_none() {
            return Err(AppError::not_found("Notification not found"));
        }
        self.notifications.mark_read(&ctx.user_id, id).await
    }

    /// Marks every unread notification read in one update. Returns how many
    /// changed.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<usize> {
        let mut update = MultiPathUpdate::new();
        for notification in self.notifications.list(&ctx.user_id).await? {
            if !notification.read {
                NotificationRepository::stage_mark_read(&mut update, &ctx.user_id, &notification.id);
            }
        }
        let changed = update.len();
        if changed > 0 {
            self.store.update(update).await?;
        }
        Ok(changed)
    }

    /// Stages removal of every `follow-request` notification in `owner`'s
    /// log that came from `from`.
    pub async fn stage_remove_follow_request_notifications(
        &self,
        update: &mut MultiPathUpdate,
        owner: &UserId,
        from: &UserId,
    ) -> AppResult<usize> {
        let mut removed = 0;
        for notification in self.notifications.list(owner).await? {
            if matches!(notification.kind, NotificationKind::FollowRequest {})
                && &notification.from.uid == from
            {
                NotificationRepository::stage_remove(update, owner, &notification.id);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Deletes the follow-request notifications `from` left in `owner`'s log.
    pub async fn remove_follow_request_notification(
        &self,
        owner: &UserId,
        from: &UserId,
    ) -> AppResult<usize> {
        let mut update = MultiPathUpdate::new();
        let removed = self
            .stage_remove_follow_request_notifications(&mut update, owner, from)
            .await?;
        if removed > 0 {
            self.store.update(update).await?;
        }
        Ok(removed)
    }

    /// Appends a reply to one of the caller's notifications and lets the
    /// original sender know.
    pub async fn reply(
        &self,
        ctx: &RequestContext,
        id: &NotificationId,
        text: &str,
    ) -> AppResult<ReplyId> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("Reply must not be empty"));
        }
        let notification = self
            .notifications
            .find(&ctx.user_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))?;

        let reply = NotificationReply {
            reply_id: ReplyId::new(),
            user_id: ctx.user_id.clone(),
            reply: text.to_string(),
            timestamp: now_millis(),
        };
        self.notifications.add_reply(&ctx.user_id, id, &reply).await?;
        info!(uid = %ctx.user_id, notification_id = %id, "Notification reply added");

        let original_sender = &notification.from.uid;
        if !ctx.is(original_sender) {
            let body = format!("Your notification received a reply: {text}");
            self.notify_best_effort(
                original_sender,
                &ctx.user_id,
                NotificationKind::NotificationReply {
                    notification_id: id.clone(),
                    reply_id: reply.reply_id.clone(),
                },
                move |_| body,
            )
            .await;
        }
        Ok(reply.reply_id)
    }

    /// Registers the caller's device token, replacing any earlier one.
    pub async fn save_token(&self, ctx: &RequestContext, token: &str) -> AppResult<()> {
        let token = token.trim();
        if !self.push.is_valid_token(token) {
            return Err(AppError::validation("Invalid push token"));
        }
        self.tokens.save(&ctx.user_id, token).await?;
        info!(uid = %ctx.user_id, "Push token saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, VALID_TOKEN};

    #[tokio::test]
    async fn test_notify_without_token_records_and_skips_push() {
        let h = Harness::new().await;
        let (a, b) = (h.user("a", "Achebe").await, h.user("b", "Banda").await);

        h.notifications
            .notify(&a, &b, NotificationKind::FollowRequest {}, |p| {
                format!("{} wants to follow you", p.family_name)
            })
            .await
            .unwrap();

        let list = h.notifications.list(&RequestContext::for_user(a)).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].message, "Banda wants to follow you");
        assert_eq!(list[0].from.family_name, "Banda");
        assert!(!list[0].read);
        assert!(h.push.sent().is_empty());
    }

    #[tokio::test]
    async fn test_notify_pushes_when_token_registered() {
        let h = Harness::new().await;
        let (a, b) = (h.user("a", "Achebe").await, h.user("b", "Banda").await);
        h.notifications
            .save_token(&RequestContext::for_user(a.clone()), VALID_TOKEN)
            .await
            .unwrap();

        h.notifications
            .notify(
                &a,
                &b,
                NotificationKind::AdminBroadcast {
                    title: "Reunion".into(),
                },
                |_| "See you in June".into(),
            )
            .await
            .unwrap();

        let sent = h.push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, VALID_TOKEN);
        assert_eq!(sent[0].title, "Famileey");
        assert_eq!(sent[0].data["type"], "admin-broadcast");
        assert_eq!(sent[0].data["title"], "Reunion");
    }

    #[tokio::test]
    async fn test_push_failure_does_not_fail_notify() {
        let h = Harness::new().await;
        let (a, b) = (h.user("a", "Achebe").await, h.user("b", "Banda").await);
        h.tokens.save(&a, VALID_TOKEN).await.unwrap();
        h.push.fail_next();

        let result = h
            .notifications
            .notify(&a, &b, NotificationKind::FollowAccepted {}, |_| "ok".into())
            .await;
        assert!(result.is_ok());
        assert_eq!(
            h.notifications
                .unread_count(&RequestContext::for_user(a))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_save_token_rejects_malformed_token() {
        let h = Harness::new().await;
        let a = h.user("a", "Achebe").await;
        let err = h
            .notifications
            .save_token(&RequestContext::for_user(a), "garbage")
            .await
            .unwrap_err();
        assert!(err.is(famileey_core::error::ErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_mark_all_read_and_unread_count() {
        let h = Harness::new().await;
        let (a, b) = (h.user("a", "Achebe").await, h.user("b", "Banda").await);
        for _ in 0..3 {
            h.notifications
                .notify(&a, &b, NotificationKind::FollowAccepted {}, |_| "x".into())
                .await
                .unwrap();
        }
        let ctx = RequestContext::for_user(a);
        assert_eq!(h.notifications.unread_count(&ctx).await.unwrap(), 3);
        assert_eq!(h.notifications.mark_all_read(&ctx).await.unwrap(), 3);
        assert_eq!(h.notifications.unread_count(&ctx).await.unwrap(), 0);
        assert_eq!(h.notifications.mark_all_read(&ctx).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_follow_request_notification_matches_sender_and_kind() {
        let h = Harness::new().await;
        let (a, b, c) = (
            h.user("a", "Achebe").await,
            h.user("b", "Banda").await,
            h.user("c", "Chege").await,
        );
        for from in [&b, &b, &c] {
            h.notifications
                .notify(&a, from, NotificationKind::FollowRequest {}, |_| "request".into())
                .await
                .unwrap();
        }
        h.notifications
            .notify(&a, &b, NotificationKind::FollowAccepted {}, |_| "accepted".into())
            .await
            .unwrap();

        assert_eq!(h.notifications.remove_follow_request_notification(&a, &b).await.unwrap(), 2);
        let left = h.notifications.list(&RequestContext::for_user(a.clone())).await.unwrap();
        assert_eq!(left.len(), 2);
        assert!(left.iter().any(|n| n.from.uid == c && n.kind == NotificationKind::FollowRequest {}));
        assert!(left.iter().any(|n| n.from.uid == b && n.kind == NotificationKind::FollowAccepted {}));

        assert_eq!(h.notifications.remove_follow_request_notification(&a, &b).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reply_notifies_original_sender() {
        let h = Harness::new().await;
        let (a, b) = (h.user("a", "Achebe").await, h.user("b", "Banda").await);
        let id = h
            .notifications
            .notify(&a, &b, NotificationKind::FollowAccepted {}, |_| "hello".into())
            .await
            .unwrap();

        let reply_id = h
            .notifications
            .reply(&RequestContext::for_user(a.clone()), &id, "thanks!")
            .await
            .unwrap();

        let own = h.notifications.list(&RequestContext::for_user(a)).await.unwrap();
        assert!(own[0].replies.contains_key(&reply_id));
        let theirs = h.notifications.list(&RequestContext::for_user(b)).await.unwrap();
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].message, "Your notification received a reply: thanks!");
        assert_eq!(
            theirs[0].kind,
            NotificationKind::NotificationReply {
                notification_id: id,
                reply_id,
            }
        );
    }

    #[tokio::test]
    async fn test_reply_to_missing_notification_is_not_found() {
        let h = Harness::new().await;
        let a = h.user("a", "Achebe").await;
        let err = h
            .notifications
            .reply(&RequestContext::for_user(a), &NotificationId::from("nope"), "hi")
            .await
            .unwrap_err();
        assert!(err.is(famileey_core::error::ErrorKind::NotFound));
    }
}
