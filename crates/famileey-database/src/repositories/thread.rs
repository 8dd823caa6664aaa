//! Message log layout shared by direct chats and group chats.

use tracing::warn;

use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::{MessageId, UserId};
use famileey_core::types::update::MultiPathUpdate;
use famileey_entity::chat::{ChatMessage, LastMessage, MessageEntry};

use crate::store::StoreManager;

/// Paths of one thread rooted at `{collection}/{threadId}`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ThreadLayout {
    collection: &'static str,
}

impl ThreadLayout {
    pub(crate) const fn new(collection: &'static str) -> Self {
        Self { collection }
    }

    pub(crate) fn root(&self, thread: &str) -> String {
        format!("{}/{thread}", self.collection)
    }

    pub(crate) fn message(&self, thread: &str, message: &MessageId) -> String {
        format!("{}/messages/{message}", self.root(thread))
    }

    pub(crate) fn last_message(&self, thread: &str) -> String {
        format!("{}/lastMessage", self.root(thread))
    }

    pub(crate) async fn messages(
        &self,
        store: &StoreManager,
        thread: &str,
    ) -> AppResult<Vec<MessageEntry>> {
        let children = store
            .get_ordered(&format!("{}/messages", self.root(thread)), "timestamp")
            .await?;
        let mut entries = Vec::with_capacity(children.len());
        for (id, raw) in children {
            match serde_json::from_value::<ChatMessage>(raw) {
                Ok(message) => entries.push(MessageEntry {
                    id: MessageId::from(id),
                    message,
                }),
                Err(e) => warn!(thread = %thread, message_id = %id, error = %e, "Skipping malformed message"),
            }
        }
        Ok(entries)
    }

    pub(crate) async fn find_message(
        &self,
        store: &StoreManager,
        thread: &str,
        message: &MessageId,
    ) -> AppResult<Option<ChatMessage>> {
        store.get_json(&self.message(thread, message)).await
    }

    pub(crate) fn stage_message(
        &self,
        update: &mut MultiPathUpdate,
        thread: &str,
        id: &MessageId,
        message: &ChatMessage,
    ) -> AppResult<()> {
        update.set_json(self.message(thread, id), message)?;
        Ok(())
    }

    pub(crate) fn stage_last_message(
        &self,
        update: &mut MultiPathUpdate,
        thread: &str,
        last: &LastMessage,
    ) -> AppResult<()> {
        update.set_json(self.last_message(thread), last)?;
        Ok(())
    }

    /// Stage read stamps on the message and on the last-message summary.
    pub(crate) fn stage_message_read(
        &self,
        update: &mut MultiPathUpdate,
        thread: &str,
        message: &MessageId,
        uid: &UserId,
        at: i64,
    ) {
        update
            .set(format!("{}/readStatus/{uid}", self.message(thread, message)), at)
            .set(format!("{}/readStatus/{uid}", self.last_message(thread)), at);
    }
}
