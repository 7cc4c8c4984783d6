//! Groq provider implementation for Plotforge
//!
//! This module implements the Provider trait against Groq's
//! OpenAI-compatible chat-completions endpoint. The API credential is
//! injected at construction time; it never lives in configuration files
//! or global state.

use crate::config::GroqConfig;
use crate::error::{PlotforgeError, Result};
use crate::providers::{CompletionResponse, Message, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Groq chat-completion provider
///
/// Sends the composed prompt to Groq's hosted endpoint with a bounded
/// request timeout. The `api_base` config override lets tests point the
/// provider at a mock server.
///
/// # Examples
///
/// ```no_run
/// use plotforge::config::GroqConfig;
/// use plotforge::providers::{GroqProvider, Provider, Message};
///
/// # async fn example() -> plotforge::error::Result<()> {
/// let provider = GroqProvider::new(GroqConfig::default(), "gsk_secret".to_string())?;
/// let messages = vec![Message::user("Plot value over year")];
/// let completion = provider.complete(&messages).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GroqProvider {
    client: Client,
    config: GroqConfig,
    api_key: String,
}

/// Request body for the chat-completions endpoint
#[derive(Debug, Serialize)]
struct GroqRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

/// Response body from the chat-completions endpoint
#[derive(Debug, Deserialize)]
struct GroqResponse {
    #[serde(default)]
    choices: Vec<GroqChoice>,
    #[serde(default)]
    usage: Option<GroqUsage>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqResponseMessage,
}

#[derive(Debug, Deserialize)]
struct GroqResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroqUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

impl GroqProvider {
    /// Create a new Groq provider instance
    ///
    /// # Arguments
    ///
    /// * `config` - Groq configuration (model, optional api_base, timeout)
    /// * `api_key` - Bearer credential, sourced from the environment by
    ///   the caller
    ///
    /// # Errors
    ///
    /// Returns error if the credential is empty or HTTP client
    /// initialization fails
    pub fn new(config: GroqConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(PlotforgeError::MissingCredentials("groq".to_string()).into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("plotforge/0.1.0")
            .build()
            .map_err(|e| PlotforgeError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Groq provider: model={}", config.model);

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Endpoint URL for chat completions
    fn endpoint(&self) -> String {
        let base = self.config.api_base.as_deref().unwrap_or(GROQ_API_BASE);
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }

    /// The configured model identifier
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Provider for GroqProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let request = GroqRequest {
            model: &self.config.model,
            messages,
        };

        tracing::debug!(
            model = %self.config.model,
            message_count = messages.len(),
            "Sending completion request to Groq"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PlotforgeError::Provider(format!("Groq request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Groq returned error {}: {}", status, body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    PlotforgeError::Authentication(format!("Groq rejected credentials: {}", status))
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    PlotforgeError::RateLimited("Groq rate limit hit".to_string())
                }
                _ => PlotforgeError::Provider(format!("Groq returned error {}: {}", status, body)),
            }
            .into());
        }

        let parsed: GroqResponse = response.json().await.map_err(|e| {
            PlotforgeError::Provider(format!("Failed to parse Groq response: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(PlotforgeError::EmptyResponse)?;

        let usage = parsed
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));

        let message = Message::assistant(content);
        Ok(match usage {
            Some(usage) => CompletionResponse::with_usage(message, usage),
            None => CompletionResponse::new(message),
        })
    }

    fn name(&self) -> &str {
        "groq"
    }
}
