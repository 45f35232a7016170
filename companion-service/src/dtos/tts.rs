use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct TtsRequest {
    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: String,
    /// When set, the generated audio id is recorded on this session.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TtsResponse {
    pub audio_url: String,
    pub audio_id: String,
}
