//! Mock provider implementations for testing.

use super::{ChatProvider, ProviderError, SpeechProvider};
use crate::models::Message;
use async_trait::async_trait;
use std::sync::Mutex;

/// Mock chat provider for testing.
///
/// Echoes the user message and remembers the history length of every call.
pub struct MockChatProvider {
    enabled: bool,
    seen_history_lens: Mutex<Vec<usize>>,
}

impl MockChatProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            seen_history_lens: Mutex::new(Vec::new()),
        }
    }

    /// History lengths passed to `complete`, in call order.
    pub fn seen_history_lens(&self) -> Vec<usize> {
        self.seen_history_lens
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn complete(
        &self,
        user_message: &str,
        history: &[Message],
    ) -> Result<String, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock chat provider not enabled".to_string(),
            ));
        }

        if let Ok(mut seen) = self.seen_history_lens.lock() {
            seen.push(history.len());
        }

        Ok(format!("Mock reply to: {}", user_message))
    }

    fn is_configured(&self) -> bool {
        self.enabled
    }
}

/// Mock speech provider for testing.
///
/// Returns the configured chunks concatenated in order.
pub struct MockSpeechProvider {
    enabled: bool,
    chunks: Vec<Vec<u8>>,
}

impl MockSpeechProvider {
    pub fn new(enabled: bool, chunks: Vec<Vec<u8>>) -> Self {
        Self { enabled, chunks }
    }

    /// Two chunks of placeholder audio, large enough to pass the size check.
    pub fn with_placeholder_audio() -> Self {
        Self::new(true, vec![vec![0xAA; 1024], vec![0xBB; 1024]])
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock speech provider not enabled".to_string(),
            ));
        }

        Ok(self.chunks.concat())
    }

    fn is_configured(&self) -> bool {
        self.enabled
    }
}
