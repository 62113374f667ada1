//! Chat provider factory.
//!
//! This module creates chat clients from provider names, resolving
//! endpoints and required credentials along the way.

use std::sync::Arc;

use lectern_core::{AppError, AppResult};

use crate::client::ChatClient;
use crate::providers::{AnthropicClient, OllamaClient};

/// Create a chat client for the named provider.
///
/// # Arguments
/// * `provider` - Provider identifier ("anthropic", "ollama", "openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (required by hosted providers)
///
/// # Errors
/// Returns a configuration error if the provider is unknown or a required
/// API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn ChatClient>> {
    match provider.to_lowercase().as_str() {
        "anthropic" | "claude" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Anthropic provider requires an API key".to_string())
            })?;
            let client = match endpoint {
                Some(endpoint) => AnthropicClient::with_base_url(api_key, endpoint)?,
                None => AnthropicClient::new(api_key)?,
            };
            Ok(Arc::new(client))
        }
        "ollama" => {
            let client = match endpoint {
                Some(endpoint) => OllamaClient::with_base_url(endpoint)?,
                None => OllamaClient::new()?,
            };
            Ok(Arc::new(client))
        }
        "openai" => {
            if api_key.is_none() {
                return Err(AppError::Config(
                    "OpenAI provider requires an API key".to_string(),
                ));
            }
            Err(AppError::Config(
                "OpenAI provider not yet implemented".to_string(),
            ))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_anthropic_client() {
        let client = create_client("anthropic", None, Some("sk-test"));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().provider_name(), "anthropic");
    }

    #[test]
    fn test_anthropic_requires_api_key() {
        match create_client("anthropic", None, None) {
            Err(err) => assert!(err.to_string().contains("requires an API key")),
            Ok(_) => panic!("Expected error for Anthropic without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
