//! Registration, sign-in, and profile handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;

use famileey_core::types::id::UserId;
use famileey_service::RegistrationRequest;

use crate::dto::request::{LoginRequest, UpdateAccountRequest};
use crate::dto::response::{ApiResponse, LoginResponse, TokenResponse, UserResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/accounts/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegistrationRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TokenResponse>>)> {
    let token = state.accounts.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "User registered successfully",
            TokenResponse { token },
        )),
    ))
}

/// POST /api/accounts/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    let (uid, token) = state.accounts.login(&req.login, &req.password).await?;
    info!(uid = %uid, "User signed in");
    Ok(Json(ApiResponse::ok(LoginResponse { uid, token })))
}

/// GET /api/accounts/user
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = state.accounts.get_profile(&auth.user_id).await?;
    Ok(Json(ApiResponse::ok(UserResponse { user })))
}

/// GET /api/accounts/user/{id}
pub async fn user_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = state.accounts.get_profile(&UserId::from(id)).await?;
    Ok(Json(ApiResponse::ok(UserResponse { user })))
}

/// PUT /api/accounts/updateaccount
pub async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateAccountRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .accounts
        .update_profile(auth.context(), req.update_data)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Profile updated",
        UserResponse { user },
    )))
}
