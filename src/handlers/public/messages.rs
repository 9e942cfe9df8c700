use axum::extract::State;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::models::{Message, MessageInput};
use crate::server::AppState;

/// POST /api/messages - contact form submission
pub async fn message_create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<MessageInput>,
) -> ApiResult<Message> {
    let message = input.validate().map_err(|errors| {
        let fields: Vec<&str> = errors.iter().filter_map(|e| e.field.as_deref()).collect();
        let summary = format!("Missing required fields: {}", fields.join(", "));
        ApiError::validation_error(summary, errors)
    })?;

    state.messages().insert(&message).await?;
    tracing::info!("Message {} received from {}", message.id, message.email);

    Ok(ApiResponse::created(message).message("Message sent successfully"))
}
