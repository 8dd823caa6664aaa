//! Repository implementations for all Famileey entities.
//!
//! Each repository owns the path layout of one family of records. Writes
//! that must land together with other repositories' writes are exposed as
//! `stage_*` methods that add entries to a shared [`MultiPathUpdate`].
//!
//! [`MultiPathUpdate`]: famileey_core::types::update::MultiPathUpdate

pub mod chat;
pub mod comment;
pub mod follow;
pub mod group;
pub mod like;
pub mod notification;
pub mod post;
pub mod presence;
pub mod push_token;
pub mod user;
pub mod view;

mod thread;

pub use chat::ChatRepository;
pub use comment::CommentRepository;
pub use follow::{FollowRepository, FollowRequestRepository};
pub use group::GroupRepository;
pub use like::LikeRepository;
pub use notification::NotificationRepository;
pub use post::PostRepository;
pub use presence::PresenceRepository;
pub use push_token::PushTokenRepository;
pub use user::UserRepository;
pub use view::ViewRepository;

use std::collections::BTreeSet;

use serde_json::Value;

/// Keys of an object subtree whose value is `true`.
pub(crate) fn true_keys<T: From<String> + Ord>(value: Option<Value>) -> BTreeSet<T> {
    match value {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter(|(_, v)| v.as_bool().unwrap_or(false))
            .map(|(k, _)| T::from(k))
            .collect(),
        _ => BTreeSet::new(),
    }
}

/// Number of children of an object subtree.
pub(crate) fn child_count(value: &Option<Value>) -> u64 {
    match value {
        Some(Value::Object(map)) => map.len() as u64,
        _ => 0,
    }
}
