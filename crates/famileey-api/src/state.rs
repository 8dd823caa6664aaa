//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use famileey_core::config::AppConfig;
use famileey_core::traits::identity::IdentityProvider;
use famileey_database::StoreManager;
use famileey_database::repositories::UserRepository;
use famileey_service::{
    AccountService, AdminService, ChatService, FeedService, GraphService, GroupService,
    NotificationService, PostService,
};

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped or cheap handles for cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Hierarchical store handle
    pub store: StoreManager,
    /// Token verification and credential records
    pub identity: Arc<dyn IdentityProvider>,
    /// Per-client request budget
    pub rate_limiter: RateLimiter,

    // ── Repositories ─────────────────────────────────────────
    /// Used by the public profile page
    pub user_repo: Arc<UserRepository>,

    // ── Services ─────────────────────────────────────────────
    pub accounts: Arc<AccountService>,
    pub feed: Arc<FeedService>,
    pub graph: Arc<GraphService>,
    pub posts: Arc<PostService>,
    pub chats: Arc<ChatService>,
    pub groups: Arc<GroupService>,
    pub notifications: Arc<NotificationService>,
    pub admin: Arc<AdminService>,
}
