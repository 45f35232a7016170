use crate::dtos::{SessionListResponse, StatusResponse};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    if !state.sessions.delete(&session_id).await {
        return Err(AppError::NotFound(anyhow::anyhow!("Session not found")));
    }

    tracing::info!(session_id = %session_id, "Session cleared");

    Ok(Json(StatusResponse {
        status: "ok".to_string(),
        message: "Session cleared".to_string(),
    }))
}

/// Debug listing of every live session id.
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    let sessions = state.sessions.list().await;
    let count = sessions.len();

    Json(SessionListResponse { sessions, count })
}
