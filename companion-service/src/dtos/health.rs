use serde::{Deserialize, Serialize};

/// Service summary returned by `GET /`. Carries only key-presence flags,
/// never the keys themselves.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub config: HealthConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthConfig {
    pub max_history_turns: usize,
    pub tts_model: String,
    pub has_minimax_key: bool,
    pub has_claude_key: bool,
    pub voice_id_prefix: Option<String>,
}
