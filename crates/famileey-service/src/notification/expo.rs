//! Expo push service client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use famileey_core::config::PushConfig;
use famileey_core::error::{AppError, ErrorKind};
use famileey_core::result::AppResult;
use famileey_core::traits::push::{PushMessage, PushSender, PushTicket};

/// Whether `token` is an Expo push token: `ExponentPushToken[..]`,
/// `ExpoPushToken[..]`, or a bare hyphenated UUID.
pub fn is_expo_push_token(token: &str) -> bool {
    let bracketed = token
        .strip_prefix("ExponentPushToken[")
        .or_else(|| token.strip_prefix("ExpoPushToken["))
        .and_then(|rest| rest.strip_suffix(']'));
    match bracketed {
        Some(inner) => !inner.is_empty() && !inner.contains(['[', ']']),
        None => token.len() == 36 && uuid::Uuid::try_parse(token).is_ok(),
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    data: Option<PushTicket>,
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

/// Sends push messages through the Expo HTTP API.
#[derive(Debug, Clone)]
pub struct ExpoPushClient {
    client: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl ExpoPushClient {
    pub fn new(config: &PushConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build push HTTP client",
                    e,
                )
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            access_token: config.access_token.clone(),
        })
    }
}

#[async_trait]
impl PushSender for ExpoPushClient {
    fn is_valid_token(&self, token: &str) -> bool {
        is_expo_push_token(token)
    }

    async fn send(&self, message: PushMessage) -> AppResult<PushTicket> {
        if !self.is_valid_token(&message.to) {
            return Err(AppError::validation(format!(
                "'{}' is not a valid Expo push token",
                message.to
            )));
        }

        let body = json!({
            "to": message.to,
            "sound": "default",
            "title": message.title,
            "body": message.body,
            "data": message.data,
            "richContent": message.rich_content,
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Upstream, "Push request failed", e))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "Push service returned {status}: {text}"
            )));
        }

        let parsed: SendResponse = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::Upstream, "Malformed push service response", e)
        })?;
        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            return Err(AppError::upstream(format!("Push service errors: {errors:?}")));
        }
        let ticket = parsed
            .data
            .ok_or_else(|| AppError::upstream("Push service returned no ticket"))?;
        if ticket.is_ok() {
            debug!(ticket_id = ?ticket.id, "Push message accepted");
        } else {
            warn!(message = ?ticket.message, "Push message rejected");
        }
        Ok(ticket)
    }
}
