//! Group chats and the per-admin broadcast group.
//!
//! A broadcast group's membership mirrors its admin's followers. It is
//! reconciled on every lookup: new followers join, members who stopped
//! following leave. The admin always stays.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info};

use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::{GroupId, MessageId, UserId};
use famileey_core::types::time::now_millis;
use famileey_core::types::update::MultiPathUpdate;
use famileey_database::StoreManager;
use famileey_database::repositories::{FollowRepository, GroupRepository, UserRepository};
use famileey_entity::chat::{
    ChatMessage, GroupChat, LastMessage, MessageEntry, MessageStatus, MessageType,
};
use famileey_entity::notification::NotificationKind;

use super::message_preview;
use crate::context::RequestContext;
use crate::notification::NotificationService;

/// Outcome of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReceipt {
    pub group_id: GroupId,
    pub message_id: MessageId,
    pub recipients: usize,
}

#[derive(Debug, Clone)]
pub struct GroupService {
    store: StoreManager,
    users: Arc<UserRepository>,
    groups: Arc<GroupRepository>,
    follows: Arc<FollowRepository>,
    notifications: NotificationService,
}

impl GroupService {
    pub fn new(
        store: StoreManager,
        users: Arc<UserRepository>,
        groups: Arc<GroupRepository>,
        follows: Arc<FollowRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            store,
            users,
            groups,
            follows,
            notifications,
        }
    }

    /// The caller's broadcast group, created on first use and reconciled
    /// with their current followers.
    ///
    /// The group id is claimed through a store transaction on the admin's
    /// broadcast slot, so concurrent first calls agree on one group.
    pub async fn get_or_create_broadcast_group(
        &self,
        ctx: &RequestContext,
    ) -> AppResult<(GroupId, GroupChat)> {
        let admin = &ctx.user_id;
        let (profile, followers, claimed) = tokio::try_join!(
            self.users.find_by_id(admin),
            self.follows.followers(admin),
            self.groups.broadcast_group_id(admin),
        )?;
        let profile = profile.ok_or_else(|| AppError::not_found("User does not exist"))?;

        if let Some(group_id) = claimed {
            if let Some(group) = self.groups.find(&group_id).await? {
                let group = self.reconcile(&group_id, group, &followers).await?;
                return Ok((group_id, group));
            }
        }

        // Groups written before the slot existed are adopted rather than
        // duplicated.
        let candidate = match self.find_unclaimed_broadcast_group(admin).await? {
            Some(existing) => existing,
            None => GroupId::new(),
        };
        let (group_id, won) = self.groups.claim_broadcast(admin, &candidate).await?;
        if let Some(group) = self.groups.find(&group_id).await? {
            let group = self.reconcile(&group_id, group, &followers).await?;
            return Ok((group_id, group));
        }

        // The owner of the slot may still be writing the group. Creation only
        // touches child paths, so completing it here is safe.
        let mut participants: BTreeMap<UserId, bool> =
            followers.iter().map(|uid| (uid.clone(), true)).collect();
        participants.insert(admin.clone(), true);
        let group = GroupChat {
            name: format!("{} Broadcast", profile.family_name),
            admin_id: admin.clone(),
            participants,
            is_broadcast_group: true,
            created_at: now_millis(),
            last_message: None,
            messages: BTreeMap::new(),
        };
        let mut update = MultiPathUpdate::new();
        GroupRepository::stage_create(&mut update, &group_id, &group);
        self.store.update(update).await?;
        if won {
            info!(admin = %admin, group_id = %group_id, members = group.participants.len(), "Broadcast group created");
        } else {
            debug!(admin = %admin, group_id = %group_id, "Broadcast group claimed concurrently, reusing");
        }
        Ok((group_id, group))
    }

    async fn find_unclaimed_broadcast_group(&self, admin: &UserId) -> AppResult<Option<GroupId>> {
        for group_id in self.groups.user_groups(admin).await? {
            let Some(group) = self.groups.find(&group_id).await? else {
                continue;
            };
            if group.is_broadcast_group && &group.admin_id == admin {
                return Ok(Some(group_id));
            }
        }
        Ok(None)
    }

    async fn reconcile(
        &self,
        group_id: &GroupId,
        mut group: GroupChat,
        followers: &BTreeSet<UserId>,
    ) -> AppResult<GroupChat> {
        let members: BTreeSet<UserId> = group.participant_ids().cloned().collect();
        let joining: Vec<&UserId> = followers
            .iter()
            .filter(|uid| !members.contains(*uid) && **uid != group.admin_id)
            .collect();
        let leaving: Vec<&UserId> = members
            .iter()
            .filter(|uid| !followers.contains(*uid) && **uid != group.admin_id)
            .collect();

        let mut update = MultiPathUpdate::new();
        for uid in &joining {
            GroupRepository::stage_add_member(&mut update, group_id, uid);
        }
        for uid in &leaving {
            GroupRepository::stage_remove_member(&mut update, group_id, uid);
        }
        if !group.is_participant(&group.admin_id) {
            GroupRepository::stage_add_member(&mut update, group_id, &group.admin_id);
            group.participants.insert(group.admin_id.clone(), true);
        }
        if update.is_empty() {
            return Ok(group);
        }
        self.store.update(update).await?;
        debug!(
            group_id = %group_id,
            joined = joining.len(),
            left = leaving.len(),
            "Broadcast group reconciled"
        );

        for uid in joining {
            group.participants.insert(uid.clone(), true);
        }
        for uid in leaving {
            group.participants.remove(uid);
        }
        Ok(group)
    }

    async fn require_member(&self, ctx: &RequestContext, group_id: &GroupId) -> AppResult<GroupChat> {
        let group = self
            .groups
            .find(group_id)
            .await?
            .ok_or_else(|| AppError::not_found("Group not found"))?;
        if !group.is_participant(&ctx.user_id) {
            return Err(AppError::forbidden("You are not a participant of this group"));
        }
        Ok(group)
    }

    /// Posts a message to a group the caller belongs to. Only the admin may
    /// post to a broadcast group.
    pub async fn send_group_message(
        &self,
        ctx: &RequestContext,
        group_id: &GroupId,
        text: &str,
        message_type: MessageType,
    ) -> AppResult<MessageId> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("Message text must not be empty"));
        }
        let group = self.require_member(ctx, group_id).await?;
        if group.is_broadcast_group && !ctx.is(&group.admin_id) {
            return Err(AppError::forbidden(
                "Only the admin can post to a broadcast group",
            ));
        }

        let now = now_millis();
        let message_id = MessageId::new();
        let message = ChatMessage {
            sender_id: ctx.user_id.clone(),
            text: text.to_string(),
            timestamp: now,
            message_type,
            status: MessageStatus::Sent,
            read_status: BTreeMap::new(),
        };
        let last = LastMessage {
            text: text.to_string(),
            timestamp: now,
            sender_id: Some(ctx.user_id.clone()),
            read_status: BTreeMap::from([(ctx.user_id.clone(), now)]),
        };
        let mut update = MultiPathUpdate::new();
        GroupRepository::stage_message(&mut update, group_id, &message_id, &message)?;
        GroupRepository::stage_last_message(&mut update, group_id, &last)?;
        self.store.update(update).await?;
        debug!(group_id = %group_id, message_id = %message_id, "Group message sent");
        Ok(message_id)
    }

    /// Sends a message to the caller's broadcast group and notifies every
    /// member except the admin.
    pub async fn broadcast_message(
        &self,
        ctx: &RequestContext,
        text: &str,
        message_type: MessageType,
    ) -> AppResult<BroadcastReceipt> {
        let (group_id, group) = self.get_or_create_broadcast_group(ctx).await?;
        let message_id = self
            .send_group_message(ctx, &group_id, text, message_type)
            .await?;

        let preview = message_preview(text.trim(), message_type);
        let recipients: Vec<&UserId> = group
            .participant_ids()
            .filter(|uid| !ctx.is(uid))
            .collect();
        let deliveries = recipients.iter().map(|uid| {
            let preview = preview.clone();
            self.notifications.notify_best_effort(
                uid,
                &ctx.user_id,
                NotificationKind::Broadcast {
                    group_id: group_id.clone(),
                    message_id: message_id.clone(),
                },
                move |p| format!("{}: {preview}", p.family_name),
            )
        });
        join_all(deliveries).await;
        info!(
            admin = %ctx.user_id,
            group_id = %group_id,
            recipients = recipients.len(),
            "Broadcast sent"
        );

        Ok(BroadcastReceipt {
            recipients: recipients.len(),
            group_id,
            message_id,
        })
    }

    /// Message log of a group, oldest first.
    pub async fn group_messages(
        &self,
        ctx: &RequestContext,
        group_id: &GroupId,
    ) -> AppResult<Vec<MessageEntry>> {
        self.require_member(ctx, group_id).await?;
        self.groups.messages(group_id).await
    }

    /// Marks a group message read by the caller. Only the message and the
    /// last-message summary are stamped; groups keep no chat-level read map.
    pub async fn read_group_message(
        &self,
        ctx: &RequestContext,
        group_id: &GroupId,
        message_id: &MessageId,
    ) -> AppResult<i64> {
        self.require_member(ctx, group_id).await?;
        let message = self
            .groups
            .find_message(group_id, message_id)
            .await?
            .ok_or_else(|| AppError::not_found("Message not found"))?;
        if ctx.is(&message.sender_id) {
            return Err(AppError::unauthorized(
                "You cannot mark your own message as read",
            ));
        }

        let now = now_millis();
        let mut update = MultiPathUpdate::new();
        GroupRepository::stage_message_read(&mut update, group_id, message_id, &ctx.user_id, now);
        self.store.update(update).await?;
        Ok(now)
    }
}
