//! Ollama provider implementation for Plotforge
//!
//! This module implements the Provider trait for Ollama, connecting to a
//! local or remote Ollama server. Useful for running the dashboard without
//! a hosted API credential.

use crate::config::OllamaConfig;
use crate::error::{PlotforgeError, Result};
use crate::providers::{CompletionResponse, Message, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama chat provider
///
/// Talks to Ollama's `/api/chat` endpoint with streaming disabled. No
/// credential is required.
#[derive(Debug)]
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

/// Request structure for the Ollama chat API
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

/// Response structure from the Ollama chat API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaResponseMessage,
    #[serde(default)]
    prompt_eval_count: usize,
    #[serde(default)]
    eval_count: usize,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("plotforge/0.1.0")
            .build()
            .map_err(|e| PlotforgeError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Ollama provider: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.config.host.trim_end_matches('/'))
    }

    /// The configured model identifier
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let request = OllamaRequest {
            model: &self.config.model,
            messages,
            stream: false,
        };

        tracing::debug!(
            model = %self.config.model,
            message_count = messages.len(),
            "Sending completion request to Ollama"
        );

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                PlotforgeError::Provider(format!("Failed to connect to Ollama server: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlotforgeError::Provider(format!(
                "Ollama returned error {}: {}",
                status, body
            ))
            .into());
        }

        let parsed: OllamaResponse = response.json().await.map_err(|e| {
            PlotforgeError::Provider(format!("Failed to parse Ollama response: {}", e))
        })?;

        if parsed.message.content.trim().is_empty() {
            return Err(PlotforgeError::EmptyResponse.into());
        }

        let usage = TokenUsage::new(parsed.prompt_eval_count, parsed.eval_count);
        Ok(CompletionResponse::with_usage(
            Message::assistant(parsed.message.content),
            usage,
        ))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_provider() {
        let provider = OllamaProvider::new(OllamaConfig::default());
        assert!(provider.is_ok());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = OllamaConfig {
            host: "http://localhost:11434/".to_string(),
            ..Default::default()
        };
        let provider = OllamaProvider::new(config).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_request_disables_streaming() {
        let messages = vec![Message::user("hi")];
        let request = OllamaRequest {
            model: "llama3.2:latest",
            messages: &messages,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{
            "message": {"role": "assistant", "content": "hello"},
            "done": true,
            "prompt_eval_count": 12,
            "eval_count": 7
        }"#;
        let parsed: OllamaResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.content, "hello");
        assert_eq!(parsed.prompt_eval_count, 12);
    }
}
