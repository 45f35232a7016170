use crate::dtos::{HealthConfig, HealthResponse};
use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub const SERVICE_NAME: &str = "companion-service";

/// Service summary with configuration flags. Never fails.
pub async fn root(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = &state.config;

    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        config: HealthConfig {
            max_history_turns: config.chat.max_history_turns,
            tts_model: config.tts.model.clone(),
            has_minimax_key: config.tts.api_key.is_some(),
            has_claude_key: config.chat.api_key.is_some(),
            voice_id_prefix: config.voice_id_prefix(),
        },
    })
}

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: the audio directory must be in place.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.config.audio.output_dir.is_dir() {
        StatusCode::OK
    } else {
        tracing::warn!(
            dir = %state.config.audio.output_dir.display(),
            "Audio output directory missing"
        );
        StatusCode::SERVICE_UNAVAILABLE
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        get_metrics(),
    )
}
