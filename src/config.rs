//! Configuration management for Plotforge
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{PlotforgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Plotforge
///
/// This structure holds all configuration needed for the dashboard,
/// including the HTTP bind address, provider settings, and generation
/// behavior. The provider API credential is deliberately *not* part of
/// this structure; it is read from the environment at startup and passed
/// to the provider constructor explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Provider configuration (Groq, Ollama)
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Chart generation behavior
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the dashboard server to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the dashboard server to
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8009
}

impl ServerConfig {
    /// Returns the `host:port` string used for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Provider configuration
///
/// Specifies which LLM provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use ("groq" or "ollama")
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Groq configuration
    #[serde(default)]
    pub groq: GroqConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_provider_type() -> String {
    "groq".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            groq: GroqConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// Groq provider configuration
///
/// The API credential is never stored here; it comes from the
/// `GROQ_API_KEY` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// Model to use for chat completions
    #[serde(default = "default_groq_model")]
    pub model: String,

    /// Optional API base URL (useful for tests and local mocks)
    ///
    /// When set, this base is used to build the chat-completions endpoint,
    /// which allows tests to point the provider at a mock server.
    #[serde(default)]
    pub api_base: Option<String>,

    /// Request timeout in seconds for completion calls
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            model: default_groq_model(),
            api_base: None,
            timeout_seconds: default_request_timeout(),
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Request timeout in seconds for completion calls
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

/// Chart generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Number of dataset rows included as text in the prompt
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Maximum number of rows returned in the upload preview grid
    #[serde(default = "default_grid_rows")]
    pub grid_rows: usize,
}

fn default_preview_rows() -> usize {
    5
}

fn default_grid_rows() -> usize {
    100
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            preview_rows: default_preview_rows(),
            grid_rows: default_grid_rows(),
        }
    }
}

impl Config {
    /// Load configuration from a file with environment and CLI overrides
    ///
    /// Loading order (later wins): file, `PLOTFORGE_*` environment
    /// variables, CLI flags. A missing file is not an error; defaults are
    /// used instead.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments providing overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PlotforgeError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| PlotforgeError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(host) = std::env::var("PLOTFORGE_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("PLOTFORGE_PORT") {
            if let Ok(value) = port.parse() {
                self.server.port = value;
            } else {
                tracing::warn!("Invalid PLOTFORGE_PORT: {}", port);
            }
        }

        if let Ok(provider_type) = std::env::var("PLOTFORGE_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(groq_model) = std::env::var("PLOTFORGE_GROQ_MODEL") {
            self.provider.groq.model = groq_model;
        }

        if let Ok(api_base) = std::env::var("PLOTFORGE_GROQ_API_BASE") {
            self.provider.groq.api_base = Some(api_base);
        }

        if let Ok(ollama_host) = std::env::var("PLOTFORGE_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("PLOTFORGE_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }

        if let Some(port) = cli.port {
            self.server.port = port;
        }

        if let Some(provider) = &cli.provider {
            self.provider.provider_type = provider.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the provider type is unknown or a generation
    /// parameter is out of range
    pub fn validate(&self) -> Result<()> {
        match self.provider.provider_type.as_str() {
            "groq" | "ollama" => {}
            other => {
                return Err(PlotforgeError::Config(format!(
                    "Unknown provider type: {} (expected groq or ollama)",
                    other
                ))
                .into());
            }
        }

        if self.generation.preview_rows == 0 {
            return Err(
                PlotforgeError::Config("generation.preview_rows must be at least 1".into()).into(),
            );
        }

        if self.provider.groq.timeout_seconds == 0 || self.provider.ollama.timeout_seconds == 0 {
            return Err(
                PlotforgeError::Config("provider timeout_seconds must be at least 1".into()).into(),
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}
