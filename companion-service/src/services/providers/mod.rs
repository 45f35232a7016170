//! AI provider abstractions and implementations.
//!
//! Chat completion and speech synthesis sit behind traits so handlers can be
//! exercised against the mocks in [`mock`].

pub mod claude;
pub mod minimax;
pub mod mock;

use crate::models::Message;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

/// Trait for chat completion providers (e.g., Claude).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send the configured system prompt, `history` and the new user message;
    /// return the assistant's reply text.
    async fn complete(
        &self,
        user_message: &str,
        history: &[Message],
    ) -> Result<String, ProviderError>;

    /// Whether credentials are present.
    fn is_configured(&self) -> bool;
}

/// Trait for speech synthesis providers (e.g., MiniMax).
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `text` and return the audio bytes in arrival order.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError>;

    /// Whether credentials are present.
    fn is_configured(&self) -> bool;
}
