//! Family listing, search, and follow workflow handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use famileey_core::types::id::{PostId, UserId};

use crate::dto::request::SearchQuery;
use crate::dto::response::{
    ApiResponse, Empty, FamiliesResponse, PostsResponse, UsersResponse, ViewCountResponse,
};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/families
pub async fn list_families(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<FamiliesResponse>>> {
    let families = state.feed.get_families(auth.context()).await?;
    Ok(Json(ApiResponse::ok(FamiliesResponse { families })))
}

/// GET /api/families/search?search=
pub async fn search_families(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<ApiResponse<UsersResponse>>> {
    let users = state.feed.search_families(&query.search).await?;
    Ok(Json(ApiResponse::ok(UsersResponse { users })))
}

/// GET /api/families/posts/{id}
pub async fn family_posts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<PostsResponse>>> {
    let posts = state
        .feed
        .get_family_posts(auth.context(), &UserId::from(id))
        .await?;
    Ok(Json(ApiResponse::ok(PostsResponse { posts })))
}

/// POST /api/families/follow/{id}
pub async fn follow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state.graph.follow(auth.context(), &UserId::from(id)).await?;
    Ok(Json(ApiResponse::message("Family followed")))
}

/// POST /api/families/unfollow/{id}
pub async fn unfollow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state.graph.unfollow(auth.context(), &UserId::from(id)).await?;
    Ok(Json(ApiResponse::message("Family unfollowed")))
}

/// POST /api/families/request-follow/{id}
pub async fn request_follow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state
        .graph
        .request_follow(auth.context(), &UserId::from(id))
        .await?;
    Ok(Json(ApiResponse::message("Follow request sent")))
}

/// POST /api/families/accept-follow/{id}; `id` is the requester.
pub async fn accept_follow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state
        .graph
        .accept_follow(auth.context(), &UserId::from(id))
        .await?;
    Ok(Json(ApiResponse::message("Follow request accepted")))
}

/// POST /api/families/decline-follow/{id}; `id` is the requester.
pub async fn decline_follow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state
        .graph
        .decline_follow(auth.context(), &UserId::from(id))
        .await?;
    Ok(Json(ApiResponse::message("Follow request declined")))
}

/// POST /api/families/cancel-follow/{id}; `id` is the target.
pub async fn cancel_follow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state
        .graph
        .cancel_follow(auth.context(), &UserId::from(id))
        .await?;
    Ok(Json(ApiResponse::message("Follow request cancelled")))
}

/// POST /api/families/postviewed/{post_id}
pub async fn post_viewed(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(post_id): Path<String>,
) -> ApiResult<Json<ApiResponse<ViewCountResponse>>> {
    let views = state.feed.record_post_view(&PostId::from(post_id)).await?;
    Ok(Json(ApiResponse::ok(ViewCountResponse { views })))
}
