//! Ollama chat provider implementation.
//!
//! Talks to Ollama's chat endpoint, mapping the shared content-block model
//! onto Ollama's flat message format. Tool calls come back without ids, so
//! this provider synthesizes them for result pairing.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use lectern_core::{AppError, AppResult};

use crate::client::ChatClient;
use crate::types::{
    ChatRequest, ChatResponse, ContentBlock, Role, StopReason, ToolDefinition, TokenUsage,
};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Maximum retry attempts for failed requests
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Ollama chat API request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OllamaTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// One message in Ollama's flat format.
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaFunctionCall {
    name: String,
    arguments: serde_json::Value,
}

/// Tool definition in Ollama's function format.
#[derive(Debug, Serialize)]
struct OllamaTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OllamaFunction,
}

#[derive(Debug, Serialize)]
struct OllamaFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

/// Ollama chat API response format.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama chat client.
pub struct OllamaClient {
    /// Base URL for the Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client against the default local endpoint.
    pub fn new() -> AppResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Convert a ChatRequest to Ollama's wire format.
    fn to_ollama_request(&self, request: &ChatRequest) -> OllamaChatRequest {
        let mut messages = Vec::new();

        // Ollama carries system instructions as a leading system message
        if let Some(ref system) = request.system {
            messages.push(OllamaMessage {
                role: "system".to_string(),
                content: system.clone(),
                tool_calls: Vec::new(),
            });
        }

        messages.extend(flatten_messages(request));

        let options = if request.temperature.is_some() || request.max_tokens > 0 {
            Some(OllamaOptions {
                temperature: request.temperature,
                num_predict: Some(request.max_tokens),
            })
        } else {
            None
        };

        OllamaChatRequest {
            model: request.model.clone(),
            messages,
            stream: false,
            tools: request.tools.iter().map(to_ollama_tool).collect(),
            options,
        }
    }

    /// Convert an Ollama response back to the shared model.
    fn convert_response(&self, response: OllamaChatResponse) -> ChatResponse {
        let mut content = Vec::new();

        if !response.message.content.is_empty() {
            content.push(ContentBlock::text(response.message.content));
        }

        let had_tool_calls = !response.message.tool_calls.is_empty();
        for (index, call) in response.message.tool_calls.into_iter().enumerate() {
            // Ollama omits call ids; synthesize stable ones for pairing
            content.push(ContentBlock::ToolUse {
                id: format!("call_{}", index),
                name: call.function.name,
                input: call.function.arguments,
            });
        }

        let stop_reason = if had_tool_calls {
            Some(StopReason::ToolUse)
        } else {
            match response.done_reason.as_deref() {
                Some("length") => Some(StopReason::MaxTokens),
                _ => Some(StopReason::EndTurn),
            }
        };

        ChatResponse {
            content,
            model: response.model,
            stop_reason,
            usage: TokenUsage::new(
                response.prompt_eval_count.unwrap_or(0),
                response.eval_count.unwrap_or(0),
            ),
        }
    }
}

fn to_ollama_tool(tool: &ToolDefinition) -> OllamaTool {
    OllamaTool {
        kind: "function",
        function: OllamaFunction {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.input_schema.clone(),
        },
    }
}

/// Flatten block-structured messages into Ollama's role/content pairs.
///
/// Tool results become separate `tool` role messages; tool-use blocks on
/// assistant messages become `tool_calls` entries.
fn flatten_messages(request: &ChatRequest) -> Vec<OllamaMessage> {
    let mut out = Vec::new();

    for message in &request.messages {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in &message.content {
            match block {
                ContentBlock::Text { text: t } => {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(t);
                }
                ContentBlock::ToolUse { name, input, .. } => {
                    tool_calls.push(OllamaToolCall {
                        function: OllamaFunctionCall {
                            name: name.clone(),
                            arguments: input.clone(),
                        },
                    });
                }
                ContentBlock::ToolResult { content, .. } => {
                    out.push(OllamaMessage {
                        role: "tool".to_string(),
                        content: content.clone(),
                        tool_calls: Vec::new(),
                    });
                }
            }
        }

        if !text.is_empty() || !tool_calls.is_empty() {
            out.push(OllamaMessage {
                role: role.to_string(),
                content: text,
                tool_calls,
            });
        }
    }

    out
}

/// Server errors are worth retrying; client errors are not.
fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait::async_trait]
impl ChatClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.to_ollama_request(request);

        debug!(
            model = %request.model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Sending chat request to Ollama"
        );

        let mut backoff_ms = INITIAL_BACKOFF_MS;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = self.client.post(&url).json(&body).send().await;

            let error = match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let wire: OllamaChatResponse = response.json().await.map_err(|e| {
                            AppError::Llm(format!("Failed to parse Ollama response: {}", e))
                        })?;
                        debug!(done_reason = ?wire.done_reason, "Received Ollama response");
                        return Ok(self.convert_response(wire));
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    let error =
                        AppError::Llm(format!("Ollama API error ({}): {}", status, error_text));

                    if !is_retryable(status) {
                        return Err(error);
                    }
                    error
                }
                Err(e) => AppError::Llm(format!("Failed to send request to Ollama: {}", e)),
            };

            if attempt >= MAX_RETRIES {
                return Err(error);
            }

            warn!(
                "Ollama request failed (attempt {}/{}), retrying in {}ms: {}",
                attempt, MAX_RETRIES, backoff_ms, error
            );
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            backoff_ms *= 2;
        }
    }
}
