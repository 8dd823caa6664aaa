//! Admin-only handlers.

use axum::Json;
use axum::extract::State;

use famileey_core::types::id::UserId;

use crate::dto::request::{MakeAdminRequest, NotifyAllRequest};
use crate::dto::response::{ApiResponse, CountResponse, Empty};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/admin/notify-all
pub async fn notify_all(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<NotifyAllRequest>,
) -> ApiResult<Json<ApiResponse<CountResponse>>> {
    let count = state
        .admin
        .notify_all(auth.context(), &req.title, &req.message)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Notification sent to all users",
        CountResponse { count },
    )))
}

/// POST /api/admin/make-admin
pub async fn make_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<MakeAdminRequest>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state
        .admin
        .make_admin(auth.context(), &UserId::from(req.user_id))
        .await?;
    Ok(Json(ApiResponse::message("User promoted to admin")))
}
