//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use famileey_api::AppState;
use famileey_auth::StoreIdentityProvider;
use famileey_core::config::AppConfig;
use famileey_core::result::AppResult;
use famileey_core::traits::identity::IdentityProvider;
use famileey_core::traits::push::{PushMessage, PushSender, PushTicket};
use famileey_core::types::id::UserId;
use famileey_database::StoreManager;
use famileey_database::store::MemoryStore;
use famileey_entity::user::UserRole;
use famileey_service::notification::is_expo_push_token;

/// Push sink that records every accepted message.
#[derive(Debug, Default)]
pub struct RecordingPushSender {
    sent: Mutex<Vec<PushMessage>>,
}

impl RecordingPushSender {
    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushSender for RecordingPushSender {
    fn is_valid_token(&self, token: &str) -> bool {
        is_expo_push_token(token)
    }

    async fn send(&self, message: PushMessage) -> AppResult<PushTicket> {
        self.sent.lock().unwrap().push(message);
        Ok(PushTicket {
            status: "ok".into(),
            id: None,
            message: None,
        })
    }
}

/// Distinct phone number per tag.
pub fn phone_for(tag: &str) -> String {
    let digits = tag
        .bytes()
        .fold(7u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)))
        % 1_000_000_000;
    format!("+1{digits:09}")
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct store access
    pub state: AppState,
    /// Recorded push messages
    pub push: Arc<RecordingPushSender>,
}

/// A registered family with its bearer token.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub uid: UserId,
    pub token: String,
}

impl TestApp {
    /// Create a new test application over an empty in-memory store.
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.server.rate_limit.enabled = false;
        Self::with_config(config)
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = StoreManager::from_store(Arc::new(MemoryStore::new()));
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(StoreIdentityProvider::new(store.clone(), &config.auth));
        let push = Arc::new(RecordingPushSender::default());

        let state = famileey_api::build_state(config, store, identity, push.clone());
        let router = famileey_api::build_app(state.clone());

        Self {
            router,
            state,
            push,
        }
    }

    /// Registration body with unique email and phone derived from `tag`.
    pub fn registration(tag: &str, family_name: &str) -> Value {
        json!({
            "familyName": family_name,
            "nativeOf": "Enugu",
            "district": "Nsukka",
            "province": "East",
            "country": "Nigeria",
            "residence": "Lagos",
            "email": format!("{tag}@example.com"),
            "phone": phone_for(tag),
            "occupation": "Farmer",
            "worksAt": "Cooperative",
            "password": "family-secret",
        })
    }

    /// Register a family through the API and sign in.
    pub async fn register(&self, tag: &str, family_name: &str) -> TestUser {
        let response = self
            .request(
                "POST",
                "/api/accounts/register",
                Some(Self::registration(tag, family_name)),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Registration failed: {:?}",
            response.body
        );

        let response = self
            .request(
                "POST",
                "/api/accounts/login",
                Some(json!({ "login": format!("{tag}@example.com"), "password": "family-secret" })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "Login failed: {:?}", response.body);

        TestUser {
            uid: UserId::from(response.body["uid"].as_str().expect("uid").to_string()),
            token: response.body["token"].as_str().expect("token").to_string(),
        }
    }

    /// Promote a user directly in the store.
    pub async fn promote(&self, user: &TestUser) {
        self.state
            .user_repo
            .set_role(&user.uid, UserRole::Admin)
            .await
            .expect("Failed to promote user");
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            text,
            content_type,
        }
    }

    pub async fn get(&self, path: &str, user: &TestUser) -> TestResponse {
        self.request("GET", path, None, Some(&user.token)).await
    }

    pub async fn post(&self, path: &str, body: Value, user: &TestUser) -> TestResponse {
        self.request("POST", path, Some(body), Some(&user.token))
            .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body (`Null` for non-JSON responses)
    pub body: Value,
    /// Raw body text
    pub text: String,
    pub content_type: String,
}
