//! Direct chat repository.
//!
//! Threads live at `chats/{chatId}`; the pair index `userChats/{a}/{b}`
//! maps each participant to the shared chat id in both directions.

use std::collections::BTreeMap;

use serde_json::Value;

use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::{ChatId, MessageId, UserId};
use famileey_core::types::update::MultiPathUpdate;
use famileey_entity::chat::{ChatMessage, DirectChat, LastMessage, MessageEntry};

use super::thread::ThreadLayout;
use crate::store::StoreManager;

const LAYOUT: ThreadLayout = ThreadLayout::new("chats");

#[derive(Debug, Clone)]
pub struct ChatRepository {
    store: StoreManager,
}

impl ChatRepository {
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    fn index_path(owner: &UserId, other: &UserId) -> String {
        format!("userChats/{owner}/{other}")
    }

    pub async fn find(&self, chat: &ChatId) -> AppResult<Option<DirectChat>> {
        self.store.get_json(&LAYOUT.root(chat.as_str())).await
    }

    /// Chat id recorded for `owner`'s thread with `other`.
    pub async fn lookup(&self, owner: &UserId, other: &UserId) -> AppResult<Option<ChatId>> {
        let value = self.store.get(&Self::index_path(owner, other)).await?;
        Ok(value.and_then(|v| v.as_str().map(ChatId::from)))
    }

    /// Claim the canonical index entry of the pair for `candidate`.
    ///
    /// The entry `userChats/{min}/{max}` is written through a transaction
    /// that refuses to overwrite an existing id. Returns the id that owns
    /// the pair and whether `candidate` won the claim.
    pub async fn claim_pair(
        &self,
        a: &UserId,
        b: &UserId,
        candidate: &ChatId,
    ) -> AppResult<(ChatId, bool)> {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let proposed = Value::from(candidate.as_str());
        let result = self
            .store
            .transaction(&Self::index_path(low, high), &move |current| match current {
                Some(Value::String(_)) => None,
                _ => Some(proposed.clone()),
            })
            .await?;

        let owner = result
            .snapshot
            .and_then(|v| v.as_str().map(ChatId::from))
            .unwrap_or_else(|| candidate.clone());
        let won = result.committed && &owner == candidate;
        Ok((owner, won))
    }

    /// Stage a new chat between `a` and `b` and both directions of the pair
    /// index.
    ///
    /// Only the creation fields are written, each at its own child path, so
    /// a message sent into the claimed chat before this update lands is
    /// kept.
    pub fn stage_create(
        update: &mut MultiPathUpdate,
        chat: &ChatId,
        a: &UserId,
        b: &UserId,
        created_at: i64,
    ) {
        let root = LAYOUT.root(chat.as_str());
        Self::stage_participants(update, chat, &[a, b]);
        update
            .set(format!("{root}/createdAt"), created_at)
            .set(format!("{root}/readStatus/{a}"), created_at)
            .set(format!("{root}/readStatus/{b}"), created_at);
        Self::stage_index(update, chat, a, b);
    }

    /// Stage both directions of the pair index.
    pub fn stage_index(update: &mut MultiPathUpdate, chat: &ChatId, a: &UserId, b: &UserId) {
        update
            .set(Self::index_path(a, b), chat.as_str())
            .set(Self::index_path(b, a), chat.as_str());
    }

    /// Stage one participant flag per member, leaving other members as
    /// they are.
    pub fn stage_participants(update: &mut MultiPathUpdate, chat: &ChatId, members: &[&UserId]) {
        let root = LAYOUT.root(chat.as_str());
        for uid in members {
            update.set(format!("{root}/participants/{uid}"), true);
        }
    }

    pub fn stage_message(
        update: &mut MultiPathUpdate,
        chat: &ChatId,
        id: &MessageId,
        message: &ChatMessage,
    ) -> AppResult<()> {
        LAYOUT.stage_message(update, chat.as_str(), id, message)
    }

    pub fn stage_last_message(
        update: &mut MultiPathUpdate,
        chat: &ChatId,
        last: &LastMessage,
    ) -> AppResult<()> {
        LAYOUT.stage_last_message(update, chat.as_str(), last)
    }

    /// Stage the chat-level read time of `uid`; `None` clears it.
    pub fn stage_read_status(
        update: &mut MultiPathUpdate,
        chat: &ChatId,
        uid: &UserId,
        at: Option<i64>,
    ) {
        let path = format!("{}/readStatus/{uid}", LAYOUT.root(chat.as_str()));
        match at {
            Some(at) => update.set(path, at),
            None => update.remove(path),
        };
    }

    /// Stage read stamps on the message and the last-message summary.
    pub fn stage_message_read(
        update: &mut MultiPathUpdate,
        chat: &ChatId,
        message: &MessageId,
        uid: &UserId,
        at: i64,
    ) {
        LAYOUT.stage_message_read(update, chat.as_str(), message, uid, at);
    }

    /// Messages ordered by timestamp ascending.
    pub async fn messages(&self, chat: &ChatId) -> AppResult<Vec<MessageEntry>> {
        LAYOUT.messages(&self.store, chat.as_str()).await
    }

    pub async fn find_message(
        &self,
        chat: &ChatId,
        message: &MessageId,
    ) -> AppResult<Option<ChatMessage>> {
        LAYOUT.find_message(&self.store, chat.as_str(), message).await
    }

    /// The pair index of `uid`: other participant to chat id.
    pub async fn user_chats(&self, uid: &UserId) -> AppResult<BTreeMap<UserId, ChatId>> {
        let Some(Value::Object(index)) = self.store.get(&format!("userChats/{uid}")).await? else {
            return Ok(BTreeMap::new());
        };
        Ok(index
            .into_iter()
            .filter_map(|(other, chat)| {
                chat.as_str()
                    .map(|id| (UserId::from(other), ChatId::from(id)))
            })
            .collect())
    }
}
