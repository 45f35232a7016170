use crate::dtos::{ChatRequest, ChatResponse};
use crate::services::metrics;
use crate::handlers::JsonBody;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

/// Send one user message within a session and return the assistant reply.
///
/// An unknown or absent `session_id` starts a new session; the response
/// carries the id to use for follow-up messages.
#[axum::debug_handler]
pub async fn chat(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    req.validate()?;

    let session = state.sessions.get_or_create(req.session_id.as_deref()).await;

    let reply = state
        .chat_provider
        .complete(&req.message, &session.history)
        .await
        .map_err(|e| {
            metrics::record_chat("provider_error");
            tracing::error!(
                session_id = %session.session_id,
                error = %e,
                "Chat provider call failed"
            );
            AppError::UpstreamError(format!("Chat provider error: {}", e))
        })?;

    let session = state
        .sessions
        .record_turn(
            &session.session_id,
            req.message,
            reply.clone(),
            state.config.chat.max_history_turns,
        )
        .await;

    metrics::record_chat("success");
    tracing::info!(
        session_id = %session.session_id,
        turn_count = session.turn_count,
        history_len = session.history.len(),
        "Chat turn completed"
    );

    Ok(Json(ChatResponse {
        reply,
        session_id: session.session_id,
        turn_count: session.turn_count,
    }))
}
