//! Hosted realtime database over its REST protocol.
//!
//! Every location `a/b/c` maps to `{database_url}/a/b/c.json`. Multi-path
//! updates are a single `PATCH` at the root, which the service applies
//! atomically. Transactions use ETag-conditional writes and retry on
//! `412 Precondition Failed`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ETAG, IF_MATCH};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use famileey_core::config::FirebaseStoreConfig;
use famileey_core::error::{AppError, ErrorKind};
use famileey_core::result::AppResult;
use famileey_core::traits::store::{KeyValueStore, TransactionFn, TransactionResult};
use famileey_core::types::ordering::sort_by_child;
use famileey_core::types::path;
use famileey_core::types::update::MultiPathUpdate;

/// Header asking the service to return the ETag of the location.
const ETAG_REQUEST_HEADER: &str = "X-Firebase-ETag";

/// REST client for the hosted realtime database.
#[derive(Debug, Clone)]
pub struct FirebaseStore {
    client: Client,
    base_url: String,
    credential: Option<String>,
    max_transaction_retries: u32,
}

impl FirebaseStore {
    /// Build a client from configuration.
    pub fn new(config: &FirebaseStoreConfig) -> AppResult<Self> {
        let base_url = config.database_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AppError::configuration(
                "store.firebase.database_url is required for the firebase provider",
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url,
            credential: config.credential.clone(),
            max_transaction_retries: config.max_transaction_retries.max(1),
        })
    }

    fn url(&self, normalized: &str) -> String {
        if normalized.is_empty() {
            format!("{}/.json", self.base_url)
        } else {
            format!("{}/{normalized}.json", self.base_url)
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credential {
            Some(credential) => request.query(&[("auth", credential)]),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> AppResult<reqwest::Response> {
        let response = self.authorize(request).send().await.map_err(|e| {
            AppError::with_source(ErrorKind::Upstream, format!("Store {action} failed"), e)
        })?;
        check_status(response, action).await
    }

    /// Read a location together with its ETag.
    async fn get_with_etag(&self, normalized: &str) -> AppResult<(Option<Value>, HeaderValue)> {
        let response = self
            .send(
                self.client
                    .get(self.url(normalized))
                    .header(ETAG_REQUEST_HEADER, "true"),
                "transaction read",
            )
            .await?;
        let etag = response
            .headers()
            .get(ETAG)
            .cloned()
            .ok_or_else(|| AppError::upstream("Store did not return an ETag"))?;
        let value = read_json(response).await?;
        Ok((value, etag))
    }
}

async fn check_status(response: reqwest::Response, action: &str) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::upstream(format!(
        "Store {action} returned {status}: {body}"
    )))
}

async fn read_json(response: reqwest::Response) -> AppResult<Option<Value>> {
    let value: Value = response.json().await.map_err(|e| {
        AppError::with_source(ErrorKind::Upstream, "Store returned invalid JSON", e)
    })?;
    Ok(if value.is_null() { None } else { Some(value) })
}

#[async_trait]
impl KeyValueStore for FirebaseStore {
    async fn get(&self, path: &str) -> AppResult<Option<Value>> {
        let normalized = path::normalize(path)?;
        let response = self.send(self.client.get(self.url(&normalized)), "read").await?;
        read_json(response).await
    }

    async fn set(&self, path: &str, value: Value) -> AppResult<()> {
        let normalized = path::normalize(path)?;
        if value.is_null() {
            return self.remove(&normalized).await;
        }
        self.send(
            self.client
                .put(self.url(&normalized))
                .query(&[("print", "silent")])
                .json(&value),
            "write",
        )
        .await?;
        Ok(())
    }

    async fn update(&self, update: MultiPathUpdate) -> AppResult<()> {
        let entries = update.validate()?;
        if entries.is_empty() {
            return Ok(());
        }
        debug!(paths = entries.len(), "Sending multi-path update");
        let body: Map<String, Value> = entries.into_iter().collect();
        self.send(
            self.client
                .patch(self.url(""))
                .query(&[("print", "silent")])
                .json(&body),
            "multi-path update",
        )
        .await?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> AppResult<()> {
        let normalized = path::normalize(path)?;
        self.send(self.client.delete(self.url(&normalized)), "delete")
            .await?;
        Ok(())
    }

    async fn get_ordered(&self, path: &str, child: &str) -> AppResult<Vec<(String, Value)>> {
        // The REST API returns ordered queries as an unordered object, so
        // the ordering is applied here.
        let mut children: Vec<(String, Value)> = match self.get(path).await? {
            Some(Value::Object(map)) => map.into_iter().collect(),
            _ => Vec::new(),
        };
        sort_by_child(&mut children, child);
        Ok(children)
    }

    async fn transaction(&self, path: &str, apply: &TransactionFn) -> AppResult<TransactionResult> {
        let normalized = path::normalize(path)?;

        for attempt in 1..=self.max_transaction_retries {
            let (current, etag) = self.get_with_etag(&normalized).await?;
            let Some(next) = apply(current.clone()) else {
                return Ok(TransactionResult {
                    committed: false,
                    snapshot: current,
                });
            };

            let response = self
                .authorize(
                    self.client
                        .put(self.url(&normalized))
                        .header(IF_MATCH, etag)
                        .json(&next),
                )
                .send()
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Upstream, "Store transaction write failed", e)
                })?;

            if response.status() == StatusCode::PRECONDITION_FAILED {
                debug!(path = %normalized, attempt, "Transaction contended, retrying");
                continue;
            }
            let response = check_status(response, "transaction write").await?;
            let snapshot = read_json(response).await?;
            return Ok(TransactionResult {
                committed: true,
                snapshot,
            });
        }

        warn!(path = %normalized, retries = self.max_transaction_retries, "Transaction gave up");
        Err(AppError::upstream(format!(
            "Transaction on '{normalized}' did not commit after {} attempts",
            self.max_transaction_retries
        )))
    }

    async fn health_check(&self) -> AppResult<bool> {
        let request = self
            .client
            .get(self.url(""))
            .query(&[("shallow", "true")]);
        match self.authorize(request).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                warn!(error = %e, "Store health check failed");
                Ok(false)
            }
        }
    }
}
