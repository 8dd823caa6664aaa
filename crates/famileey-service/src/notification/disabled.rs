//! Push sink used when delivery is turned off.

use async_trait::async_trait;
use tracing::debug;

use famileey_core::error::AppError;
use famileey_core::result::AppResult;
use famileey_core::traits::push::{PushMessage, PushSender, PushTicket};

use super::expo::is_expo_push_token;

/// Accepts well-formed tokens and drops every message.
#[derive(Debug, Clone, Default)]
pub struct DisabledPushSender;

#[async_trait]
impl PushSender for DisabledPushSender {
    fn is_valid_token(&self, token: &str) -> bool {
        is_expo_push_token(token)
    }

    async fn send(&self, message: PushMessage) -> AppResult<PushTicket> {
        if !self.is_valid_token(&message.to) {
            return Err(AppError::validation("Invalid push token"));
        }
        debug!(to = %message.to, "Push delivery disabled, dropping message");
        Ok(PushTicket {
            status: "ok".to_string(),
            id: None,
            message: Some("push delivery disabled".to_string()),
        })
    }
}
