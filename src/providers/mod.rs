//! Provider module for Plotforge
//!
//! This module contains the LLM provider abstraction and implementations
//! for Groq (hosted) and Ollama (local).

pub mod base;
pub mod groq;
pub mod ollama;

pub use base::{CompletionResponse, Message, Provider, TokenUsage};
pub use groq::GroqProvider;
pub use ollama::OllamaProvider;

use crate::config::ProviderConfig;
use crate::error::{PlotforgeError, Result};
use std::sync::Arc;

/// Create a provider instance based on configuration
///
/// The credential for hosted providers is passed in explicitly (the
/// caller reads it from the environment); the provider is constructed
/// once at startup and injected into the generation flow.
///
/// # Arguments
///
/// * `config` - Provider configuration
/// * `groq_api_key` - Credential for the Groq provider, if available
///
/// # Errors
///
/// Returns error if the provider type is unknown, the Groq credential is
/// missing, or initialization fails
pub fn create_provider(
    config: &ProviderConfig,
    groq_api_key: Option<String>,
) -> Result<Arc<dyn Provider>> {
    match config.provider_type.as_str() {
        "groq" => {
            let api_key = groq_api_key
                .ok_or_else(|| PlotforgeError::MissingCredentials("groq".to_string()))?;
            Ok(Arc::new(GroqProvider::new(config.groq.clone(), api_key)?))
        }
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.ollama.clone())?)),
        other => {
            Err(PlotforgeError::Provider(format!("Unknown provider type: {}", other)).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_groq() {
        let config = ProviderConfig::default();
        let provider = create_provider(&config, Some("gsk_test".to_string())).unwrap();
        assert_eq!(provider.name(), "groq");
    }

    #[test]
    fn test_create_provider_groq_without_key() {
        let config = ProviderConfig::default();
        let result = create_provider(&config, None);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Missing credentials"));
    }

    #[test]
    fn test_create_provider_ollama() {
        let config = ProviderConfig {
            provider_type: "ollama".to_string(),
            ..Default::default()
        };
        let provider = create_provider(&config, None).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_create_provider_invalid_type() {
        let config = ProviderConfig {
            provider_type: "invalid".to_string(),
            ..Default::default()
        };
        let result = create_provider(&config, None);
        assert!(result.is_err());
    }
}
