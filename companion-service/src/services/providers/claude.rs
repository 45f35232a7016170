//! Claude chat provider.
//!
//! Calls the Anthropic Messages API with the configured system prompt, the
//! session history and the new user message.

use super::{ChatProvider, ProviderError};
use crate::models::Message;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude provider configuration.
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: Option<SecretString>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub system_prompt: String,
}

/// Claude chat provider. Holds one HTTP client for the life of the service.
pub struct ClaudeChatProvider {
    config: ClaudeConfig,
    client: Client,
}

impl ClaudeChatProvider {
    pub fn new(config: ClaudeConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn build_request<'a>(
        &'a self,
        user_message: &'a str,
        history: &'a [Message],
    ) -> CreateMessageRequest<'a> {
        let messages = history
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .chain(std::iter::once(ApiMessage {
                role: "user",
                content: user_message,
            }))
            .collect();

        CreateMessageRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: &self.config.system_prompt,
            messages,
        }
    }
}

#[async_trait]
impl ChatProvider for ClaudeChatProvider {
    async fn complete(
        &self,
        user_message: &str,
        history: &[Message],
    ) -> Result<String, ProviderError> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            ProviderError::NotConfigured("CLAUDE_API_KEY is not set".to_string())
        })?;

        let request = self.build_request(user_message, history);

        tracing::debug!(
            model = %self.config.model,
            history_len = history.len(),
            message_len = user_message.len(),
            "Sending request to Claude API"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Claude API error {}: {}",
                status, error_text
            )));
        }

        let api_response: CreateMessageResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let text = api_response
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .ok_or_else(|| {
                ProviderError::EmptyResponse("Claude returned no text content".to_string())
            })?;

        if let Some(usage) = api_response.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Claude API usage"
            );
        }

        Ok(text)
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

// ============================================================================
// Claude API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateMessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ClaudeChatProvider {
        ClaudeChatProvider::new(ClaudeConfig {
            api_key: None,
            api_url: "http://127.0.0.1:9".to_string(),
            model: "claude-test".to_string(),
            max_tokens: 300,
            system_prompt: "be nice".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_request_appends_user_message_after_history() {
        let provider = provider();
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        let request = provider.build_request("how are you?", &history);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["system"], "be nice");
        assert_eq!(json["max_tokens"], 300);
        assert_eq!(json["messages"].as_array().unwrap().len(), 3);
        assert_eq!(json["messages"][1]["role"], "assistant");
        assert_eq!(json["messages"][2]["role"], "user");
        assert_eq!(json["messages"][2]["content"], "how are you?");
    }

    #[test]
    fn test_response_skips_non_text_blocks() {
        let body = r#"{
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "first"},
                {"type": "text", "text": "second"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 3}
        }"#;
        let parsed: CreateMessageResponse = serde_json::from_str(body).unwrap();
        let first = parsed.content.into_iter().find_map(|b| match b {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        });
        assert_eq!(first.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let provider = provider();
        assert!(!provider.is_configured());

        let err = provider.complete("hi", &[]).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
