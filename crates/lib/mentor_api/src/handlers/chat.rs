// @awa-component: API-ChatHandler
//
//! Chat request handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::SecondsFormat;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{ChatRequest, ChatResponse};

/// `POST /api/chat` — relay a message to the caller's conversation.
///
/// Reuses the conversation for `(userType, sessionId)` across requests, so
/// the upstream model sees the accumulated history.
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(body) = payload?;
    let message = body
        .message
        .ok_or_else(|| AppError::Validation("Message is required".into()))?;

    let reply = state
        .relay
        .submit_message(
            &message,
            body.user_type.as_deref(),
            body.session_id.as_deref(),
        )
        .await
        .map_err(|e| AppError::from_chat(e, state.config.expose_error_details))?;

    Ok(Json(ChatResponse {
        reply: reply.reply,
        user_type: reply.category.to_string(),
        session_id: reply.session_id,
        success: true,
        timestamp: reply.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
