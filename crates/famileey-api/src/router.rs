//! Route definitions for the Famileey HTTP API.
//!
//! All JSON routes are mounted under `/api`; the public profile page lives
//! at the root.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(account_routes())
        .merge(family_routes())
        .merge(post_routes())
        .merge(messaging_routes())
        .merge(notification_routes())
        .merge(admin_routes())
        .route("/health", get(handlers::health::health));

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .route(
            "/profile/{user_id}",
            get(handlers::profile_page::profile_page),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Registration, sign-in, profile
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/register", post(handlers::account::register))
        .route("/accounts/login", post(handlers::account::login))
        .route("/accounts/user", get(handlers::account::current_user))
        .route("/accounts/user/{id}", get(handlers::account::user_by_id))
        .route(
            "/accounts/updateaccount",
            put(handlers::account::update_account),
        )
}

/// Ranking, search, and the follow workflow
fn family_routes() -> Router<AppState> {
    Router::new()
        .route("/families", get(handlers::family::list_families))
        .route("/families/search", get(handlers::family::search_families))
        .route("/families/posts/{id}", get(handlers::family::family_posts))
        .route("/families/follow/{id}", post(handlers::family::follow))
        .route("/families/unfollow/{id}", post(handlers::family::unfollow))
        .route(
            "/families/request-follow/{id}",
            post(handlers::family::request_follow),
        )
        .route(
            "/families/accept-follow/{id}",
            post(handlers::family::accept_follow),
        )
        .route(
            "/families/decline-follow/{id}",
            post(handlers::family::decline_follow),
        )
        .route(
            "/families/cancel-follow/{id}",
            post(handlers::family::cancel_follow),
        )
        .route(
            "/families/postviewed/{post_id}",
            post(handlers::family::post_viewed),
        )
}

fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(handlers::post::list_posts))
        .route("/posts/upload", post(handlers::post::upload))
        .route("/posts/{id}", get(handlers::post::get_post))
        .route("/posts/like/{id}", post(handlers::post::like))
        .route("/posts/unlike/{id}", post(handlers::post::unlike))
        .route("/posts/likes/{id}", get(handlers::post::likes))
        .route(
            "/posts/comments/{id}",
            get(handlers::post::comments).post(handlers::post::add_comment),
        )
        .route(
            "/posts/comments/{post_id}/{comment_id}",
            delete(handlers::post::delete_comment),
        )
}

/// Direct chats, presence, and broadcast groups
fn messaging_routes() -> Router<AppState> {
    Router::new()
        .route("/messaging/send", post(handlers::messaging::send_message))
        .route(
            "/messaging/messages/{chat_id}",
            get(handlers::messaging::chat_messages),
        )
        .route("/messaging/chats", get(handlers::messaging::user_chats))
        .route(
            "/messaging/read/{chat_id}/{message_id}",
            patch(handlers::messaging::mark_read),
        )
        .route(
            "/messaging/getOrCreateChatId",
            post(handlers::messaging::get_or_create_chat_id),
        )
        .route(
            "/messaging/inchat/{chat_id}/{status}",
            post(handlers::messaging::set_in_chat),
        )
        .route(
            "/messaging/broadcast/group",
            get(handlers::messaging::broadcast_group),
        )
        .route("/messaging/broadcast", post(handlers::messaging::broadcast))
        .route(
            "/messaging/group/send",
            post(handlers::messaging::send_group_message),
        )
        .route(
            "/messaging/group/messages/{group_id}",
            get(handlers::messaging::group_messages),
        )
        .route(
            "/messaging/group/read/{group_id}/{message_id}",
            patch(handlers::messaging::read_group_message),
        )
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::notification::list))
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read/{id}",
            post(handlers::notification::mark_read),
        )
        .route(
            "/notifications/read-all",
            post(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/reply/{id}",
            post(handlers::notification::reply),
        )
        .route(
            "/notifications/token",
            post(handlers::notification::save_token),
        )
}

/// Admin-only actions
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/notify-all", post(handlers::admin::notify_all))
        .route("/admin/make-admin", post(handlers::admin::make_admin))
}
