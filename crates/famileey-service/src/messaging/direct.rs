//! One-to-one chats, the unified chat list, read state, and presence.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::{ChatId, GroupId, MessageId, UserId};
use famileey_core::types::time::now_millis;
use famileey_core::types::update::MultiPathUpdate;
use famileey_database::StoreManager;
use famileey_database::repositories::{
    ChatRepository, GroupRepository, PresenceRepository, UserRepository,
};
use famileey_entity::chat::{
    ChatKind, ChatMessage, ChatSummary, DirectChat, LastMessage, MessageEntry, MessageStatus,
    MessageType, ParticipantView,
};
use famileey_entity::notification::NotificationKind;

use super::message_preview;
use crate::context::RequestContext;
use crate::notification::NotificationService;

/// Result of a sent direct message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Direct chats between two families.
#[derive(Debug, Clone)]
pub struct ChatService {
    store: StoreManager,
    users: Arc<UserRepository>,
    chats: Arc<ChatRepository>,
    groups: Arc<GroupRepository>,
    presence: Arc<PresenceRepository>,
    notifications: NotificationService,
}

impl ChatService {
    pub fn new(
        store: StoreManager,
        users: Arc<UserRepository>,
        chats: Arc<ChatRepository>,
        groups: Arc<GroupRepository>,
        presence: Arc<PresenceRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            store,
            users,
            chats,
            groups,
            presence,
            notifications,
        }
    }

    /// The chat shared by `a` and `b`, created on first use.
    ///
    /// Creation claims the pair's canonical index entry through a store
    /// transaction, so concurrent first messages agree on one chat id.
    pub async fn get_or_create_chat_id(&self, a: &UserId, b: &UserId) -> AppResult<ChatId> {
        if a == b {
            return Err(AppError::validation("A chat needs two different users"));
        }
        if let Some(id) = self.chats.lookup(a, b).await? {
            return Ok(id);
        }
        if let Some(id) = self.chats.lookup(b, a).await? {
            let mut update = MultiPathUpdate::new();
            ChatRepository::stage_index(&mut update, &id, a, b);
            self.store.update(update).await?;
            return Ok(id);
        }

        let candidate = ChatId::new();
        let (chat_id, won) = self.chats.claim_pair(a, b, &candidate).await?;
        let mut update = MultiPathUpdate::new();
        if won {
            ChatRepository::stage_create(&mut update, &chat_id, a, b, now_millis());
            info!(chat_id = %chat_id, a = %a, b = %b, "Chat created");
        } else {
            ChatRepository::stage_index(&mut update, &chat_id, a, b);
            debug!(chat_id = %chat_id, "Chat claimed concurrently, reusing");
        }
        self.store.update(update).await?;
        Ok(chat_id)
    }

    /// Sends a message from the caller to `recipient`.
    ///
    /// The message, the last-message summary, the sender's read stamp, and
    /// the cleared recipient stamp are one update. The recipient is notified
    /// afterwards unless they are viewing the chat.
    pub async fn send_message(
        &self,
        ctx: &RequestContext,
        recipient: &UserId,
        text: &str,
        message_type: MessageType,
    ) -> AppResult<SentMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("Message text must not be empty"));
        }
        if ctx.is(recipient) {
            return Err(AppError::validation("You cannot message yourself"));
        }
        if !self.users.exists(recipient).await? {
            return Err(AppError::not_found(format!("User '{recipient}' not found")));
        }

        let sender = &ctx.user_id;
        let chat_id = self.get_or_create_chat_id(sender, recipient).await?;
        let chat = self.chats.find(&chat_id).await?;

        let now = now_millis();
        let message_id = MessageId::new();
        let message = ChatMessage {
            sender_id: sender.clone(),
            text: text.to_string(),
            timestamp: now,
            message_type,
            status: MessageStatus::Sent,
            read_status: BTreeMap::new(),
        };
        let last = LastMessage {
            text: text.to_string(),
            timestamp: now,
            sender_id: Some(sender.clone()),
            read_status: BTreeMap::from([(sender.clone(), now)]),
        };

        let mut update = MultiPathUpdate::new();
        let has_both = chat.as_ref().is_some_and(|c| {
            let ids: BTreeSet<&UserId> = c.participant_ids().collect();
            ids.contains(sender) && ids.contains(recipient)
        });
        if !has_both {
            ChatRepository::stage_participants(&mut update, &chat_id, &[sender, recipient]);
        }
        ChatRepository::stage_message(&mut update, &chat_id, &message_id, &message)?;
        ChatRepository::stage_last_message(&mut update, &chat_id, &last)?;
        ChatRepository::stage_read_status(&mut update, &chat_id, sender, Some(now));
        ChatRepository::stage_read_status(&mut update, &chat_id, recipient, None);
        self.store.update(update).await?;
        debug!(chat_id = %chat_id, message_id = %message_id, "Message sent");

        let viewing = match self.presence.is_in_chat(recipient, chat_id.as_str()).await {
            Ok(flag) => flag,
            Err(e) => {
                warn!(recipient = %recipient, chat_id = %chat_id, error = %e, "Presence lookup failed");
                false
            }
        };
        if !viewing {
            let preview = message_preview(text, message_type);
            self.notifications
                .notify_best_effort(
                    recipient,
                    sender,
                    NotificationKind::Message {
                        chat_id: chat_id.clone(),
                        message_id: message_id.clone(),
                    },
                    move |p| format!("{}: {preview}", p.family_name),
                )
                .await;
        }

        Ok(SentMessage {
            chat_id,
            message_id,
        })
    }

    async fn require_participant(&self, ctx: &RequestContext, chat_id: &ChatId) -> AppResult<DirectChat> {
        let chat = self
            .chats
            .find(chat_id)
            .await?
            .ok_or_else(|| AppError::not_found("Chat not found"))?;
        if !chat.participant_ids().any(|uid| ctx.is(uid)) {
            return Err(AppError::forbidden("You are not a participant of this chat"));
        }
        Ok(chat)
    }

    /// Message log of a chat, oldest first.
    pub async fn get_chat_messages(
        &self,
        ctx: &RequestContext,
        chat_id: &ChatId,
    ) -> AppResult<Vec<MessageEntry>> {
        self.require_participant(ctx, chat_id).await?;
        self.chats.messages(chat_id).await
    }

    /// Direct and group threads of the caller, most recent activity first.
    pub async fn get_user_chats(&self, ctx: &RequestContext) -> AppResult<Vec<ChatSummary>> {
        let uid = &ctx.user_id;
        let (index, group_ids) =
            tokio::try_join!(self.chats.user_chats(uid), self.groups.user_groups(uid))?;

        let mut seen = BTreeSet::new();
        let direct: Vec<(UserId, ChatId)> = index
            .into_iter()
            .filter(|(_, chat_id)| seen.insert(chat_id.clone()))
            .collect();

        let (direct, groups) = tokio::try_join!(
            try_join_all(direct.iter().map(|(other, id)| self.direct_summary(uid, other, id))),
            try_join_all(group_ids.iter().map(|id| self.group_summary(uid, id))),
        )?;

        let mut summaries: Vec<ChatSummary> =
            direct.into_iter().chain(groups).flatten().collect();
        summaries.sort_by(|a, b| {
            b.activity()
                .cmp(&a.activity())
                .then_with(|| a.chat_id.cmp(&b.chat_id))
        });
        Ok(summaries)
    }

    async fn direct_summary(
        &self,
        uid: &UserId,
        other: &UserId,
        chat_id: &ChatId,
    ) -> AppResult<Option<ChatSummary>> {
        let Some(chat) = self.chats.find(chat_id).await? else {
            warn!(uid = %uid, chat_id = %chat_id, "Chat index points at a missing chat");
            return Ok(None);
        };
        let others: Vec<UserId> = chat
            .participant_ids()
            .filter(|p| *p != uid)
            .cloned()
            .collect();
        let participants = self.participants(&others).await;
        Ok(Some(ChatSummary {
            chat_id: chat_id.to_string(),
            kind: ChatKind::Direct,
            with_user: Some(other.clone()),
            name: None,
            is_broadcast_group: false,
            participants,
            read_status: chat.read_status.get(uid).copied(),
            has_read: chat.has_read(uid),
            last_message: chat.last_message,
        }))
    }

    async fn group_summary(&self, uid: &UserId, group_id: &GroupId) -> AppResult<Option<ChatSummary>> {
        let Some(group) = self.groups.find(group_id).await? else {
            warn!(uid = %uid, group_id = %group_id, "Group index points at a missing group");
            return Ok(None);
        };
        let others: Vec<UserId> = group
            .participant_ids()
            .filter(|p| *p != uid)
            .cloned()
            .collect();
        let participants = self.participants(&others).await;
        Ok(Some(ChatSummary {
            chat_id: group_id.to_string(),
            kind: ChatKind::Group,
            with_user: None,
            has_read: group.has_read(uid),
            read_status: group
                .last_message
                .as_ref()
                .and_then(|m| m.read_status.get(uid).copied()),
            name: Some(group.name),
            is_broadcast_group: group.is_broadcast_group,
            participants,
            last_message: group.last_message,
        }))
    }

    /// Resolves profiles; a failed or missing lookup becomes an error marker
    /// on that participant only.
    async fn participants(&self, uids: &[UserId]) -> Vec<ParticipantView> {
        let lookups = uids.iter().map(|uid| async move {
            match self.users.find_by_id(uid).await {
                Ok(Some(profile)) => ParticipantView {
                    uid: uid.clone(),
                    profile: Some(profile),
                    error: None,
                },
                Ok(None) => ParticipantView {
                    uid: uid.clone(),
                    profile: None,
                    error: Some("User not found".to_string()),
                },
                Err(e) => ParticipantView {
                    uid: uid.clone(),
                    profile: None,
                    error: Some(e.message),
                },
            }
        });
        futures::future::join_all(lookups).await
    }

    /// Marks `message_id` read by the caller. Stamps the message, the
    /// last-message summary, and the chat-level read status together.
    pub async fn mark_chat_as_read(
        &self,
        ctx: &RequestContext,
        chat_id: &ChatId,
        message_id: &MessageId,
    ) -> AppResult<i64> {
        self.require_participant(ctx, chat_id).await?;
        let message = self
            .chats
            .find_message(chat_id, message_id)
            .await?
            .ok_or_else(|| AppError::not_found("Message not found"))?;
        if ctx.is(&message.sender_id) {
            return Err(AppError::unauthorized(
                "You cannot mark your own message as read",
            ));
        }

        let now = now_millis();
        let mut update = MultiPathUpdate::new();
        ChatRepository::stage_message_read(&mut update, chat_id, message_id, &ctx.user_id, now);
        ChatRepository::stage_read_status(&mut update, chat_id, &ctx.user_id, Some(now));
        self.store.update(update).await?;
        Ok(now)
    }

    /// Records whether the caller is viewing `chat`. Any string is accepted
    /// as the chat key.
    pub async fn set_in_chat_status(
        &self,
        ctx: &RequestContext,
        chat: &str,
        in_chat: bool,
    ) -> AppResult<()> {
        if chat.trim().is_empty() {
            return Err(AppError::validation("Chat id must not be empty"));
        }
        self.presence.set(&ctx.user_id, chat, in_chat).await
    }
}
