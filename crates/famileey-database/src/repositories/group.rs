//! Group chat repository.
//!
//! Groups live at `groupChats/{groupId}`; `userGroups/{uid}/{groupId}`
//! indexes the groups each member belongs to, and
//! `userBroadcastGroup/{uid}` holds the id of the broadcast group `uid`
//! administers.

use serde_json::Value;

use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::{GroupId, MessageId, UserId};
use famileey_core::types::update::MultiPathUpdate;
use famileey_entity::chat::{ChatMessage, GroupChat, LastMessage, MessageEntry};

use super::thread::ThreadLayout;
use crate::store::StoreManager;

const LAYOUT: ThreadLayout = ThreadLayout::new("groupChats");

#[derive(Debug, Clone)]
pub struct GroupRepository {
    store: StoreManager,
}

impl GroupRepository {
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    fn index_path(uid: &UserId, group: &GroupId) -> String {
        format!("userGroups/{uid}/{group}")
    }

    pub async fn find(&self, group: &GroupId) -> AppResult<Option<GroupChat>> {
        self.store.get_json(&LAYOUT.root(group.as_str())).await
    }

    /// Groups `uid` belongs to.
    pub async fn user_groups(&self, uid: &UserId) -> AppResult<Vec<GroupId>> {
        match self.store.get(&format!("userGroups/{uid}")).await? {
            Some(Value::Object(map)) => Ok(map
                .into_iter()
                .filter(|(_, v)| v.as_bool().unwrap_or(false))
                .map(|(k, _)| GroupId::from(k))
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    fn broadcast_path(admin: &UserId) -> String {
        format!("userBroadcastGroup/{admin}")
    }

    /// Id of the broadcast group claimed by `admin`.
    pub async fn broadcast_group_id(&self, admin: &UserId) -> AppResult<Option<GroupId>> {
        let value = self.store.get(&Self::broadcast_path(admin)).await?;
        Ok(value.and_then(|v| v.as_str().map(GroupId::from)))
    }

    /// Claim `admin`'s broadcast slot for `candidate`.
    ///
    /// The slot is written through a transaction that refuses to overwrite
    /// an existing id. Returns the id that owns the slot and whether
    /// `candidate` won the claim.
    pub async fn claim_broadcast(
        &self,
        admin: &UserId,
        candidate: &GroupId,
    ) -> AppResult<(GroupId, bool)> {
        let proposed = Value::from(candidate.as_str());
        let result = self
            .store
            .transaction(&Self::broadcast_path(admin), &move |current| match current {
                Some(Value::String(_)) => None,
                _ => Some(proposed.clone()),
            })
            .await?;

        let owner = result
            .snapshot
            .and_then(|v| v.as_str().map(GroupId::from))
            .unwrap_or_else(|| candidate.clone());
        let won = result.committed && &owner == candidate;
        Ok((owner, won))
    }

    /// Stage the creation fields of `record` and the index entry of every
    /// participant.
    ///
    /// Each field goes to its own child path, so staging the same group
    /// twice, or after messages were posted, never drops thread content.
    pub fn stage_create(
        update: &mut MultiPathUpdate,
        group: &GroupId,
        record: &GroupChat,
    ) {
        let root = LAYOUT.root(group.as_str());
        update
            .set(format!("{root}/name"), record.name.as_str())
            .set(format!("{root}/adminId"), record.admin_id.as_str())
            .set(format!("{root}/isBroadcastGroup"), record.is_broadcast_group)
            .set(format!("{root}/createdAt"), record.created_at);
        for uid in record.participant_ids() {
            Self::stage_add_member(update, group, uid);
        }
    }

    pub fn stage_add_member(update: &mut MultiPathUpdate, group: &GroupId, uid: &UserId) {
        update
            .set(
                format!("{}/participants/{uid}", LAYOUT.root(group.as_str())),
                true,
            )
            .set(Self::index_path(uid, group), true);
    }

    pub fn stage_remove_member(update: &mut MultiPathUpdate, group: &GroupId, uid: &UserId) {
        update
            .remove(format!(
                "{}/participants/{uid}",
                LAYOUT.root(group.as_str())
            ))
            .remove(Self::index_path(uid, group));
    }

    pub fn stage_message(
        update: &mut MultiPathUpdate,
        group: &GroupId,
        id: &MessageId,
        message: &ChatMessage,
    ) -> AppResult<()> {
        LAYOUT.stage_message(update, group.as_str(), id, message)
    }

    pub fn stage_last_message(
        update: &mut MultiPathUpdate,
        group: &GroupId,
        last: &LastMessage,
    ) -> AppResult<()> {
        LAYOUT.stage_last_message(update, group.as_str(), last)
    }

    /// Stage read stamps on the message and the last-message summary.
    pub fn stage_message_read(
        update: &mut MultiPathUpdate,
        group: &GroupId,
        message: &MessageId,
        uid: &UserId,
        at: i64,
    ) {
        LAYOUT.stage_message_read(update, group.as_str(), message, uid, at);
    }

    pub async fn messages(&self, group: &GroupId) -> AppResult<Vec<MessageEntry>> {
        LAYOUT.messages(&self.store, group.as_str()).await
    }

    pub async fn find_message(
        &self,
        group: &GroupId,
        message: &MessageId,
    ) -> AppResult<Option<ChatMessage>> {
        LAYOUT.find_message(&self.store, group.as_str(), message).await
    }
}
