//! Post, like, and comment handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use famileey_core::types::id::{CommentId, PostId};
use famileey_service::NewPost;

use crate::dto::request::{CommentRequest, UploadPostRequest};
use crate::dto::response::{
    ApiResponse, CommentCreatedResponse, CommentsResponse, Empty, LikesResponse,
    PostCreatedResponse, PostResponse, PostsResponse,
};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/posts
pub async fn list_posts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<PostsResponse>>> {
    let posts = state.posts.list_posts(auth.context()).await?;
    Ok(Json(ApiResponse::ok(PostsResponse { posts })))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<PostResponse>>> {
    let post = state.posts.get_post(auth.context(), &PostId::from(id)).await?;
    Ok(Json(ApiResponse::ok(PostResponse { post })))
}

/// POST /api/posts/upload
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UploadPostRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<PostCreatedResponse>>)> {
    let post_id = state
        .posts
        .upload(
            auth.context(),
            NewPost {
                story: req.story,
                photo_url: req.photo_url,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Post uploaded",
            PostCreatedResponse { post_id },
        )),
    ))
}

/// POST /api/posts/like/{id}
pub async fn like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state.posts.like(auth.context(), &PostId::from(id)).await?;
    Ok(Json(ApiResponse::message("Post liked")))
}

/// POST /api/posts/unlike/{id}
pub async fn unlike(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state.posts.unlike(auth.context(), &PostId::from(id)).await?;
    Ok(Json(ApiResponse::message("Post unliked")))
}

/// GET /api/posts/likes/{id}
pub async fn likes(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<LikesResponse>>> {
    let likes = state.posts.likes(&PostId::from(id)).await?;
    Ok(Json(ApiResponse::ok(LikesResponse { likes })))
}

/// GET /api/posts/comments/{id}
pub async fn comments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<CommentsResponse>>> {
    let comments = state.posts.comments(&PostId::from(id)).await?;
    Ok(Json(ApiResponse::ok(CommentsResponse { comments })))
}

/// POST /api/posts/comments/{id}
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<Json<ApiResponse<CommentCreatedResponse>>> {
    let comment_id = state
        .posts
        .add_comment(auth.context(), &PostId::from(id), &req.comment)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Comment added",
        CommentCreatedResponse { comment_id },
    )))
}

/// DELETE /api/posts/comments/{post_id}/{comment_id}
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state
        .posts
        .delete_comment(
            auth.context(),
            &PostId::from(post_id),
            &CommentId::from(comment_id),
        )
        .await?;
    Ok(Json(ApiResponse::message("Comment deleted")))
}
