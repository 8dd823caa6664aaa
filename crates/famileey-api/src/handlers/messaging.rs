//! Direct chat and broadcast group handlers.

use axum::Json;
use axum::extract::{Path, State};

use famileey_core::error::AppError;
use famileey_core::types::id::{ChatId, GroupId, MessageId, UserId};

use crate::dto::request::{
    BroadcastRequest, ChatPairRequest, GroupMessageRequest, SendMessageRequest,
};
use crate::dto::response::{
    ApiResponse, BroadcastResponse, ChatIdResponse, ChatsResponse, Empty, GroupMessageResponse,
    GroupResponse, MessagesResponse, ReadResponse, SentMessageResponse,
};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/messaging/send
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<ApiResponse<SentMessageResponse>>> {
    let sent = state
        .chats
        .send_message(
            auth.context(),
            &UserId::from(req.recipient_id),
            &req.text,
            req.message_type,
        )
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Message sent",
        SentMessageResponse {
            chat_id: sent.chat_id,
            message_id: sent.message_id,
        },
    )))
}

/// GET /api/messaging/messages/{chat_id}
pub async fn chat_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<String>,
) -> ApiResult<Json<ApiResponse<MessagesResponse>>> {
    let messages = state
        .chats
        .get_chat_messages(auth.context(), &ChatId::from(chat_id))
        .await?;
    Ok(Json(ApiResponse::ok(MessagesResponse { messages })))
}

/// GET /api/messaging/chats
pub async fn user_chats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<ChatsResponse>>> {
    let chats = state.chats.get_user_chats(auth.context()).await?;
    Ok(Json(ApiResponse::ok(ChatsResponse { chats })))
}

/// PATCH /api/messaging/read/{chat_id}/{message_id}
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((chat_id, message_id)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<ReadResponse>>> {
    let read_at = state
        .chats
        .mark_chat_as_read(
            auth.context(),
            &ChatId::from(chat_id),
            &MessageId::from(message_id),
        )
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Chat marked as read",
        ReadResponse { read_at },
    )))
}

/// POST /api/messaging/getOrCreateChatId
///
/// The caller must be one of the pair.
pub async fn get_or_create_chat_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChatPairRequest>,
) -> ApiResult<Json<ApiResponse<ChatIdResponse>>> {
    let user_a = req
        .user_a
        .map(UserId::from)
        .unwrap_or_else(|| auth.user_id.clone());
    let user_b = UserId::from(req.user_b);
    if !auth.is(&user_a) && !auth.is(&user_b) {
        return Err(AppError::forbidden("You can only open chats you take part in").into());
    }
    let chat_id = state.chats.get_or_create_chat_id(&user_a, &user_b).await?;
    Ok(Json(ApiResponse::ok(ChatIdResponse { chat_id })))
}

/// POST /api/messaging/inchat/{chat_id}/{status}
pub async fn set_in_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((chat_id, status)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    state
        .chats
        .set_in_chat_status(auth.context(), &chat_id, status == "true")
        .await?;
    Ok(Json(ApiResponse::message("Presence updated")))
}

/// GET /api/messaging/broadcast/group
pub async fn broadcast_group(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<GroupResponse>>> {
    let (group_id, group) = state
        .groups
        .get_or_create_broadcast_group(auth.context())
        .await?;
    Ok(Json(ApiResponse::ok(GroupResponse { group_id, group })))
}

/// POST /api/messaging/broadcast
pub async fn broadcast(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BroadcastRequest>,
) -> ApiResult<Json<ApiResponse<BroadcastResponse>>> {
    let receipt = state
        .groups
        .broadcast_message(auth.context(), &req.text, req.message_type)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Broadcast sent",
        BroadcastResponse {
            group_id: receipt.group_id,
            message_id: receipt.message_id,
            recipients: receipt.recipients,
        },
    )))
}

/// POST /api/messaging/group/send
pub async fn send_group_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<GroupMessageRequest>,
) -> ApiResult<Json<ApiResponse<GroupMessageResponse>>> {
    let group_id = GroupId::from(req.group_id);
    let message_id = state
        .groups
        .send_group_message(auth.context(), &group_id, &req.text, req.message_type)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Message sent",
        GroupMessageResponse {
            group_id,
            message_id,
        },
    )))
}

/// GET /api/messaging/group/messages/{group_id}
pub async fn group_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<String>,
) -> ApiResult<Json<ApiResponse<MessagesResponse>>> {
    let messages = state
        .groups
        .group_messages(auth.context(), &GroupId::from(group_id))
        .await?;
    Ok(Json(ApiResponse::ok(MessagesResponse { messages })))
}

/// PATCH /api/messaging/group/read/{group_id}/{message_id}
pub async fn read_group_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((group_id, message_id)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<ReadResponse>>> {
    let read_at = state
        .groups
        .read_group_message(
            auth.context(),
            &GroupId::from(group_id),
            &MessageId::from(message_id),
        )
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Message marked as read",
        ReadResponse { read_at },
    )))
}
