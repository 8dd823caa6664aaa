//! Notification inbox, replies, and push-token registration.

use axum::Json;
use axum::extract::{Path, State};

use famileey_core::types::id::NotificationId;

use crate::dto::request::{PushTokenRequest, ReplyRequest};
use crate::dto::response::{
    ApiResponse, CountResponse, Empty, NotificationsResponse, ReplyResponse,
};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/notifications
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<NotificationsResponse>>> {
    let notifications = state.notifications.list(auth.context()).await?;
    Ok(Json(ApiResponse::ok(NotificationsResponse { notifications })))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<CountResponse>>> {
    let count = state.notifications.unread_count(auth.context()).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// POST /api/notifications/read/{id}
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state
        .notifications
        .mark_read(auth.context(), &NotificationId::from(id))
        .await?;
    Ok(Json(ApiResponse::message("Notification marked as read")))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<CountResponse>>> {
    let count = state.notifications.mark_all_read(auth.context()).await?;
    Ok(Json(ApiResponse::with_message(
        "All notifications marked as read",
        CountResponse { count },
    )))
}

/// POST /api/notifications/reply/{id}
pub async fn reply(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<ReplyRequest>,
) -> ApiResult<Json<ApiResponse<ReplyResponse>>> {
    let reply_id = state
        .notifications
        .reply(auth.context(), &NotificationId::from(id), &req.reply)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Reply sent",
        ReplyResponse { reply_id },
    )))
}

/// POST /api/notifications/token
pub async fn save_token(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<PushTokenRequest>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state
        .notifications
        .save_token(auth.context(), &req.expo_token)
        .await?;
    Ok(Json(ApiResponse::message("Expo token saved")))
}
