//! Anthropic chat provider implementation.
//!
//! Talks to the Messages API. The shared [`ChatRequest`] type already
//! serializes to the Messages API body, so only the response needs a wire
//! struct. Messages API: https://docs.anthropic.com/en/api/messages

use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use lectern_core::{AppError, AppResult};

use crate::client::ChatClient;
use crate::types::{ChatRequest, ChatResponse, ContentBlock, StopReason, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Maximum retry attempts for rate-limited or failed requests
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Anthropic Messages API response.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: String,
    #[serde(default)]
    stop_reason: Option<StopReason>,
    #[serde(default)]
    usage: WireUsage,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl MessagesResponse {
    fn into_response(self) -> ChatResponse {
        ChatResponse {
            content: self.content,
            model: self.model,
            stop_reason: self.stop_reason,
            usage: TokenUsage::new(self.usage.input_tokens, self.usage.output_tokens),
        }
    }
}

/// Anthropic chat client.
pub struct AnthropicClient {
    /// Base URL for the Messages API
    base_url: String,

    /// API key sent as `x-api-key`
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Create a new Anthropic client against the public API.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a new Anthropic client with a custom base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }
}

/// Rate limits and server errors are worth retrying; everything else is not.
fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait::async_trait]
impl ChatClient for AnthropicClient {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let url = format!("{}/v1/messages", self.base_url);

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending chat request to Anthropic"
        );

        let mut backoff_ms = INITIAL_BACKOFF_MS;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = self
                .client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(request)
                .send()
                .await;

            let error = match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let wire: MessagesResponse = response.json().await.map_err(|e| {
                            AppError::Llm(format!("Failed to parse Anthropic response: {}", e))
                        })?;
                        debug!(stop_reason = ?wire.stop_reason, "Received Anthropic response");
                        return Ok(wire.into_response());
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    let error = AppError::Llm(format!(
                        "Anthropic API error ({}): {}",
                        status, error_text
                    ));

                    if !is_retryable(status) {
                        return Err(error);
                    }
                    error
                }
                Err(e) => AppError::Llm(format!("Failed to send request to Anthropic: {}", e)),
            };

            if attempt >= MAX_RETRIES {
                return Err(error);
            }

            warn!(
                "Anthropic request failed (attempt {}/{}), retrying in {}ms: {}",
                attempt, MAX_RETRIES, backoff_ms, error
            );
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            backoff_ms *= 2;
        }
    }
}
