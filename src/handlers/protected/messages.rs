use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::models::{Message, MessageStatusUpdate};
use crate::server::AppState;

/// GET /api/messages - inbox, newest first
pub async fn message_list(State(state): State<AppState>) -> ApiResult<Vec<Message>> {
    let mut messages = state.messages().all().await?;
    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(ApiResponse::success(messages).message("Messages retrieved successfully"))
}

/// PATCH /api/messages/:id - set `read`, or toggle it when absent
pub async fn message_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<MessageStatusUpdate>,
) -> ApiResult<Message> {
    let messages = state.messages();
    let mut message = messages
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Message not found"))?;

    message.set_read(update);
    if !messages.save(&message).await? {
        return Err(ApiError::not_found("Message not found"));
    }

    Ok(ApiResponse::success(message).message("Message status updated"))
}

/// DELETE /api/messages/:id
pub async fn message_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    if !state.messages().delete(&id).await? {
        return Err(ApiError::not_found("Message not found"));
    }

    Ok(ApiResponse::success(()).message("Message removed successfully"))
}
