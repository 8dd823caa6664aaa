//! Notification log repository.

use serde_json::Value;
use tracing::warn;

use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::{NotificationId, UserId};
use famileey_core::types::update::MultiPathUpdate;
use famileey_entity::notification::{Notification, NotificationReply};

use crate::store::StoreManager;

/// Repository for notifications stored at `notifications/{uid}/{id}`.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    store: StoreManager,
}

impl NotificationRepository {
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    fn path(owner: &UserId, id: &NotificationId) -> String {
        format!("notifications/{owner}/{id}")
    }

    pub async fn insert(&self, owner: &UserId, notification: &Notification) -> AppResult<()> {
        self.store
            .set(&Self::path(owner, &notification.id), notification.to_record()?)
            .await
    }

    /// Find one notification. A malformed record reads as absent.
    pub async fn find(
        &self,
        owner: &UserId,
        id: &NotificationId,
    ) -> AppResult<Option<Notification>> {
        let Some(raw) = self.store.get(&Self::path(owner, id)).await? else {
            return Ok(None);
        };
        match Notification::from_record(id.clone(), raw) {
            Ok(notification) => Ok(Some(notification)),
            Err(e) => {
                warn!(owner = %owner, notification_id = %id, error = %e, "Malformed notification");
                Ok(None)
            }
        }
    }

    /// Every well-formed notification of `owner`, in key order.
    pub async fn list(&self, owner: &UserId) -> AppResult<Vec<Notification>> {
        let Some(Value::Object(records)) = self.store.get(&format!("notifications/{owner}")).await?
        else {
            return Ok(Vec::new());
        };
        let mut notifications = Vec::with_capacity(records.len());
        for (id, raw) in records {
            match Notification::from_record(NotificationId::from(id.as_str()), raw) {
                Ok(notification) => notifications.push(notification),
                Err(e) => {
                    warn!(owner = %owner, notification_id = %id, error = %e, "Skipping malformed notification")
                }
            }
        }
        Ok(notifications)
    }

    pub fn stage_mark_read(update: &mut MultiPathUpdate, owner: &UserId, id: &NotificationId) {
        update.set(format!("{}/read", Self::path(owner, id)), true);
    }

    pub fn stage_remove(update: &mut MultiPathUpdate, owner: &UserId, id: &NotificationId) {
        update.remove(Self::path(owner, id));
    }

    pub async fn mark_read(&self, owner: &UserId, id: &NotificationId) -> AppResult<()> {
        self.store
            .set(&format!("{}/read", Self::path(owner, id)), Value::Bool(true))
            .await
    }

    pub async fn add_reply(
        &self,
        owner: &UserId,
        id: &NotificationId,
        reply: &NotificationReply,
    ) -> AppResult<()> {
        self.store
            .set_json(
                &format!("{}/replies/{}", Self::path(owner, id), reply.reply_id),
                reply,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;
    use famileey_entity::notification::{NotificationKind, NotificationSender};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_skips_records_without_type() {
        let store = StoreManager::from_store(Arc::new(MemoryStore::with_tree(json!({
            "notifications": {"u1": {"bad": {"message": "no type"}}}
        }))));
        let repo = NotificationRepository::new(store);
        let owner = UserId::from("u1");
        let good = Notification {
            id: NotificationId::from("good"),
            kind: NotificationKind::FollowAccepted {},
            from: NotificationSender {
                uid: UserId::from("u2"),
                family_name: "Kamau".into(),
            },
            message: "Kamau accepted your request".into(),
            timestamp: 5,
            read: false,
            rich_content: None,
            replies: BTreeMap::new(),
        };
        repo.insert(&owner, &good).await.unwrap();

        let listed = repo.list(&owner).await.unwrap();
        assert_eq!(listed, vec![good]);
        assert!(repo.find(&owner, &NotificationId::from("bad")).await.unwrap().is_none());
    }
}
