//! Application builder: wires repositories, services, router, and middleware.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tracing::{info, warn};

use famileey_auth::{PasswordValidator, StoreIdentityProvider};
use famileey_core::config::AppConfig;
use famileey_core::error::{AppError, ErrorKind};
use famileey_core::result::AppResult;
use famileey_core::traits::identity::IdentityProvider;
use famileey_core::traits::push::PushSender;
use famileey_core::traits::store::KeyValueStore;
use famileey_database::StoreManager;
use famileey_database::repositories::{
    ChatRepository, CommentRepository, FollowRepository, FollowRequestRepository,
    GroupRepository, LikeRepository, NotificationRepository, PostRepository, PresenceRepository,
    PushTokenRepository, UserRepository, ViewRepository,
};
use famileey_service::{
    AccountService, AdminService, ChatService, DisabledPushSender, EngagementReader,
    ExpoPushClient, FeedService, GraphService, GroupService, NotificationService, PostService,
    ProfileReader,
};

use crate::middleware::rate_limit::RateLimiter;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Wires every repository and service over one store handle.
pub fn build_state(
    config: AppConfig,
    store: StoreManager,
    identity: Arc<dyn IdentityProvider>,
    push: Arc<dyn PushSender>,
) -> AppState {
    // ── Repositories ─────────────────────────────────────────────
    let user_repo = Arc::new(UserRepository::new(store.clone()));
    let follow_repo = Arc::new(FollowRepository::new(store.clone()));
    let request_repo = Arc::new(FollowRequestRepository::new(store.clone()));
    let post_repo = Arc::new(PostRepository::new(store.clone()));
    let like_repo = Arc::new(LikeRepository::new(store.clone()));
    let comment_repo = Arc::new(CommentRepository::new(store.clone()));
    let view_repo = Arc::new(ViewRepository::new(store.clone()));
    let chat_repo = Arc::new(ChatRepository::new(store.clone()));
    let group_repo = Arc::new(GroupRepository::new(store.clone()));
    let presence_repo = Arc::new(PresenceRepository::new(store.clone()));
    let notification_repo = Arc::new(NotificationRepository::new(store.clone()));
    let token_repo = Arc::new(PushTokenRepository::new(store.clone()));

    // ── Shared readers ───────────────────────────────────────────
    let profiles = ProfileReader::new(Arc::clone(&user_repo), Arc::clone(&follow_repo));
    let engagement = EngagementReader::new(
        Arc::clone(&like_repo),
        Arc::clone(&comment_repo),
        Arc::clone(&view_repo),
        profiles.clone(),
        config.feed,
    );
    let notifications = NotificationService::new(
        store.clone(),
        notification_repo,
        Arc::clone(&user_repo),
        token_repo,
        push,
        config.push.title.clone(),
    );

    // ── Services ─────────────────────────────────────────────────
    let accounts = AccountService::new(
        Arc::clone(&identity),
        Arc::clone(&user_repo),
        profiles.clone(),
        PasswordValidator::new(&config.auth),
    );
    let feed = FeedService::new(
        Arc::clone(&user_repo),
        Arc::clone(&post_repo),
        Arc::clone(&like_repo),
        Arc::clone(&comment_repo),
        view_repo,
        Arc::clone(&follow_repo),
        engagement.clone(),
    );
    let graph = GraphService::new(
        store.clone(),
        Arc::clone(&user_repo),
        Arc::clone(&follow_repo),
        request_repo,
        notifications.clone(),
    );
    let posts = PostService::new(
        post_repo,
        like_repo,
        comment_repo,
        profiles,
        engagement,
        notifications.clone(),
    );
    let chats = ChatService::new(
        store.clone(),
        Arc::clone(&user_repo),
        chat_repo,
        Arc::clone(&group_repo),
        presence_repo,
        notifications.clone(),
    );
    let groups = GroupService::new(
        store.clone(),
        Arc::clone(&user_repo),
        group_repo,
        follow_repo,
        notifications.clone(),
    );
    let admin = AdminService::new(Arc::clone(&user_repo), notifications.clone());

    AppState {
        rate_limiter: RateLimiter::new(&config.server.rate_limit),
        config: Arc::new(config),
        store,
        identity,
        user_repo,
        accounts: Arc::new(accounts),
        feed: Arc::new(feed),
        graph: Arc::new(graph),
        posts: Arc::new(posts),
        chats: Arc::new(chats),
        groups: Arc::new(groups),
        notifications: Arc::new(notifications),
        admin: Arc::new(admin),
    }
}

/// Selects the push sink from configuration.
fn build_push_sender(config: &AppConfig) -> AppResult<Arc<dyn PushSender>> {
    if config.push.enabled {
        info!(endpoint = %config.push.endpoint, "Push delivery enabled");
        Ok(Arc::new(ExpoPushClient::new(&config.push)?))
    } else {
        info!("Push delivery disabled");
        Ok(Arc::new(DisabledPushSender::default()))
    }
}

/// Runs the Famileey server with the given configuration.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    info!("Starting Famileey server...");

    // ── Step 1: Store ────────────────────────────────────────────
    info!(provider = %config.store.provider, "Initializing store");
    let store = StoreManager::new(&config.store).await?;
    match store.health_check().await {
        Ok(true) => info!("Store reachable"),
        Ok(false) => warn!("Store health check reported unhealthy"),
        Err(e) => warn!(error = %e, "Store health check failed"),
    }

    // ── Step 2: Identity and push ────────────────────────────────
    let identity: Arc<dyn IdentityProvider> =
        Arc::new(StoreIdentityProvider::new(store.clone(), &config.auth));
    let push = build_push_sender(&config)?;

    // ── Step 3: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_app(build_state(config, store, identity, push));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, format!("Failed to bind {addr}"), e)
        })?;

    info!(addr = %addr, "Famileey server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("Famileey server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
