use crate::dtos::{TtsRequest, TtsResponse};
use crate::models::AudioArtifact;
use crate::handlers::JsonBody;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

/// Synthesize speech for `text` and return the URL of the audio file.
#[axum::debug_handler]
pub async fn generate_tts(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<TtsRequest>,
) -> Result<Json<TtsResponse>, AppError> {
    req.validate()?;

    let audio_id = AudioArtifact::generate_id();

    let artifact = state
        .speech
        .synthesize(&req.text, &audio_id)
        .await
        .map_err(|e| AppError::UpstreamError(format!("Speech synthesis failed: {}", e)))?;

    if let Some(session_id) = req.session_id.as_deref() {
        if !state
            .sessions
            .attach_audio(session_id, artifact.audio_id.clone())
            .await
        {
            tracing::warn!(
                session_id = %session_id,
                audio_id = %artifact.audio_id,
                "Audio generated for unknown session"
            );
        }
    }

    Ok(Json(TtsResponse {
        audio_url: artifact.url,
        audio_id: artifact.audio_id,
    }))
}
