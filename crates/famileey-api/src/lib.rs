//! # famileey-api
//!
//! HTTP API layer for Famileey built on Axum.
//!
//! Provides the REST endpoints under `/api`, the public profile page,
//! middleware (rate limiting, CORS, logging), the bearer-token extractor,
//! DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use error::ApiError;
pub use state::AppState;
