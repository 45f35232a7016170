use secrecy::SecretString;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MAX_HISTORY_TURNS: usize = 8;
pub const DEFAULT_MIN_AUDIO_BYTES: usize = 1000;
pub const DEFAULT_CLAUDE_MAX_TOKENS: u32 = 300;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a warm, attentive companion chatting over a \
messaging app. Speak in the first person, reply in two to four short sentences, keep a \
casual texting tone and never use emoji.";

#[derive(Debug, Clone)]
pub struct CompanionConfig {
    pub common: core_config::Config,
    pub chat: ChatConfig,
    pub tts: TtsConfig,
    pub audio: AudioConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: Option<SecretString>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub system_prompt: String,
    /// Number of user/assistant turns kept per session.
    pub max_history_turns: usize,
}

#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub api_key: Option<SecretString>,
    pub ws_url: String,
    pub model: String,
    pub voice_id: String,
    /// Anything smaller is treated as a failed synthesis.
    pub min_audio_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl CompanionConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(CompanionConfig {
            common: common_config,
            chat: ChatConfig {
                api_key: get_secret("CLAUDE_API_KEY", is_prod)?,
                api_url: get_env(
                    "CLAUDE_API_URL",
                    Some("https://api.anthropic.com/v1/messages"),
                    is_prod,
                )?,
                model: get_env("CLAUDE_MODEL", Some("claude-sonnet-4-5-20250929"), is_prod)?,
                max_tokens: get_parsed("CLAUDE_MAX_TOKENS", DEFAULT_CLAUDE_MAX_TOKENS),
                system_prompt: get_env("SYSTEM_PROMPT", Some(DEFAULT_SYSTEM_PROMPT), is_prod)?,
                max_history_turns: get_parsed("MAX_HISTORY_TURNS", DEFAULT_MAX_HISTORY_TURNS),
            },
            tts: TtsConfig {
                api_key: get_secret("MINIMAX_API_KEY", is_prod)?,
                ws_url: get_env(
                    "TTS_WS_URL",
                    Some("wss://api.minimax.io/ws/v1/t2a_v2"),
                    is_prod,
                )?,
                model: get_env("TTS_MODEL", Some("speech-02-turbo"), is_prod)?,
                voice_id: get_env("VOICE_ID", Some("male-qn-qingse"), is_prod)?,
                min_audio_bytes: get_parsed("TTS_MIN_AUDIO_BYTES", DEFAULT_MIN_AUDIO_BYTES),
            },
            audio: AudioConfig {
                output_dir: PathBuf::from(get_env(
                    "AUDIO_OUTPUT_DIR",
                    Some("static/audio"),
                    is_prod,
                )?),
            },
            observability: ObservabilityConfig {
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
            },
        })
    }

    /// Voice id shortened for display, so the full identifier is never echoed.
    pub fn voice_id_prefix(&self) -> Option<String> {
        if self.tts.voice_id.is_empty() {
            return None;
        }
        let prefix: String = self.tts.voice_id.chars().take(20).collect();
        Some(format!("{}...", prefix))
    }
}

/// Read `key`, falling back to `default`. Only keys without a default are
/// required, and the message says so when running in production.
fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match (env::var(key), default) {
        (Ok(val), _) => Ok(val),
        (Err(_), Some(def)) => Ok(def.to_string()),
        (Err(_), None) if is_prod => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required in production but not set",
            key
        ))),
        (Err(_), None) => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required but not set",
            key
        ))),
    }
}

/// Provider keys are optional outside production; the health endpoint reports
/// whether they are present.
fn get_secret(key: &str, is_prod: bool) -> Result<Option<SecretString>, AppError> {
    match env::var(key) {
        Ok(val) if !val.is_empty() => Ok(Some(SecretString::new(val))),
        _ if is_prod => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required in production but not set",
            key
        ))),
        _ => Ok(None),
    }
}

fn get_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
