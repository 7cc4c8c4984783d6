//! Error types for Plotforge
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Plotforge operations
///
/// This enum encompasses all possible errors that can occur during
/// upload handling, prompt composition, provider interactions, and
/// chart interpretation.
///
/// Note that a model response without a fenced code block is *not* an
/// error: it is the valid commentary-only outcome and is represented by
/// `Option::None` at the extraction layer.
#[derive(Error, Debug)]
pub enum PlotforgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Uploaded payload could not be decoded or parsed as a table
    #[error("Upload parse error: {0}")]
    UploadParse(String),

    /// Generation preconditions not met (no dataset, blank request)
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Provider-related errors (API calls, malformed responses, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Authentication errors (e.g., 401/403 from the provider)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Provider rejected the request due to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Provider returned a completion with no usable content
    #[error("Provider returned an empty response")]
    EmptyResponse,

    /// Missing credentials for a provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Model output matched the code-block contract but could not be
    /// interpreted into a chart
    #[error("Chart interpretation error: {0}")]
    ChartExecution(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Plotforge operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
