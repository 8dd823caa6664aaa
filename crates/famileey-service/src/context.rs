//! Request context carrying the authenticated user.

use serde::{Deserialize, Serialize};

use famileey_core::types::id::UserId;
use famileey_core::types::time::now_millis;

/// Context for the current authenticated request.
///
/// Built by the API extractor from a verified token and passed into
/// service methods so that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's id.
    pub user_id: UserId,
    /// Email carried by the token, if any.
    pub email: Option<String>,
    /// When the request was received (epoch milliseconds).
    pub request_time: i64,
}

impl RequestContext {
    pub fn new(user_id: UserId, email: Option<String>) -> Self {
        Self {
            user_id,
            email,
            request_time: now_millis(),
        }
    }

    /// Context for `uid` without token details (tests and internal calls).
    pub fn for_user(uid: impl Into<UserId>) -> Self {
        Self::new(uid.into(), None)
    }

    pub fn is(&self, uid: &UserId) -> bool {
        &self.user_id == uid
    }
}
