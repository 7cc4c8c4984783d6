//! Base provider trait and common types for Plotforge
//!
//! This module defines the Provider trait that all LLM providers must
//! implement, along with the message and response structures shared by the
//! prompt composer and the generation flow.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message structure for a chat-completion conversation
///
/// Messages can be from the user, the assistant, or the system directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (user, assistant, system)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use plotforge::providers::Message;
    ///
    /// let msg = Message::user("Plot value over year");
    /// assert_eq!(msg.role, "user");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// Token usage information from a completion, as reported by the provider
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use plotforge::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Completion response with message and optional token usage
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The response message from the model
    pub message: Message,
    /// Optional token usage information
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Create a new CompletionResponse without usage data
    pub fn new(message: Message) -> Self {
        Self {
            message,
            usage: None,
        }
    }

    /// Create a new CompletionResponse with token usage
    pub fn with_usage(message: Message, usage: TokenUsage) -> Self {
        Self {
            message,
            usage: Some(usage),
        }
    }
}

/// Provider trait for hosted chat-completion endpoints
///
/// All LLM providers (Groq, Ollama) implement this trait. The generation
/// flow depends only on the trait, which keeps the core testable with a
/// substitutable fake provider.
///
/// # Examples
///
/// ```no_run
/// use plotforge::providers::{Provider, Message, CompletionResponse};
/// use plotforge::error::Result;
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct MyProvider;
///
/// #[async_trait]
/// impl Provider for MyProvider {
///     async fn complete(&self, _messages: &[Message]) -> Result<CompletionResponse> {
///         Ok(CompletionResponse::new(Message::assistant("Response")))
///     }
///
///     fn name(&self) -> &str {
///         "my-provider"
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Completes a conversation with the given messages
    ///
    /// # Arguments
    ///
    /// * `messages` - System directive, prior turns, and the new request
    ///
    /// # Returns
    ///
    /// Returns the model's response message along with token usage when
    /// the provider reports it
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails, the provider rejects the
    /// request (auth, rate limit), or the response carries no content
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse>;

    /// Short identifier of this provider for logging
    fn name(&self) -> &str;
}
