//! Chat request and response types.
//!
//! This module defines the provider-agnostic message model used by every
//! chat client: role-tagged messages made of content blocks, declarative
//! tool definitions, and stop-reason/usage metadata. The block structure
//! follows the Anthropic Messages API, which the Ollama provider maps onto
//! its own wire format.

use serde::{Deserialize, Serialize};

/// Default generation budget when the caller does not set one.
pub const DEFAULT_MAX_TOKENS: u32 = 800;

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of message content.
///
/// Assistant responses mix `Text` and `ToolUse` blocks; tool outcomes go
/// back to the model as `ToolResult` blocks inside a user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "is_false")]
        is_error: bool,
    },
}

fn is_false(value: &bool) -> bool {
    !value
}

impl ContentBlock {
    /// Build a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Build a successful tool result block.
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Build a failed tool result block.
    pub fn tool_error(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl ChatMessage {
    /// Build a plain-text user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Build a plain-text assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Build a message from pre-assembled blocks.
    pub fn from_blocks(role: Role, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    /// Build the user message that carries tool results back to the model.
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: results,
        }
    }
}

/// Declarative description of a callable tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's parameters
    pub input_schema: serde_json::Value,
}

/// How the model may choose tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides whether to call a tool
    Auto,
    /// The model must call some tool
    Any,
    /// Tool calls are disabled
    None,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    #[serde(other)]
    Other,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u32,

    #[serde(default)]
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// A chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (e.g., "claude-sonnet-4-0", "llama3.2")
    pub model: String,

    /// Conversation so far, oldest first
    pub messages: Vec<ChatMessage>,

    /// System instructions (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature for sampling (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Tools the model may call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Tool selection mode, set when tools are present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

impl ChatRequest {
    /// Create a request with required fields and defaults.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            tools: Vec::new(),
            tool_choice: None,
        }
    }

    /// Set the system instructions.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Append one message.
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Replace the message list.
    pub fn with_messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Attach tool definitions; enables automatic tool choice.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        if !tools.is_empty() {
            self.tool_choice = Some(ToolChoice::Auto);
        }
        self.tools = tools;
        self
    }
}

/// A chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Response content blocks in model order
    pub content: Vec<ContentBlock>,

    /// Model that generated the response
    pub model: String,

    /// Why generation stopped
    pub stop_reason: Option<StopReason>,

    /// Usage statistics
    #[serde(default)]
    pub usage: TokenUsage,
}

impl ChatResponse {
    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether the model requested any tool execution.
    pub fn wants_tools(&self) -> bool {
        self.stop_reason == Some(StopReason::ToolUse)
            || self
                .content
                .iter()
                .any(|block| matches!(block, ContentBlock::ToolUse { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::new("llama3.2")
            .with_system("Be brief.")
            .with_message(ChatMessage::user("hello"))
            .with_max_tokens(100)
            .with_temperature(0.0);

        assert_eq!(request.model, "llama3.2");
        assert_eq!(request.system.as_deref(), Some("Be brief."));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, 100);
        assert_eq!(request.temperature, Some(0.0));
        assert!(request.tool_choice.is_none());
    }

    #[test]
    fn test_with_tools_enables_auto_choice() {
        let tool = ToolDefinition {
            name: "search".to_string(),
            description: "Search things".to_string(),
            input_schema: json!({"type": "object"}),
        };

        let request = ChatRequest::new("m").with_tools(vec![tool]);
        assert_eq!(request.tool_choice, Some(ToolChoice::Auto));

        let bare = ChatRequest::new("m").with_tools(vec![]);
        assert!(bare.tool_choice.is_none());
    }

    #[test]
    fn test_content_block_serialization() {
        let block = ContentBlock::ToolUse {
            id: "toolu_1".to_string(),
            name: "search_course_content".to_string(),
            input: json!({"query": "mcp"}),
        };

        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_use");
        assert_eq!(value["name"], "search_course_content");
        assert_eq!(value["input"]["query"], "mcp");
    }

    #[test]
    fn test_tool_result_skips_is_error_when_false() {
        let ok = serde_json::to_value(ContentBlock::tool_result("toolu_1", "found")).unwrap();
        assert!(ok.get("is_error").is_none());

        let failed = serde_json::to_value(ContentBlock::tool_error("toolu_1", "boom")).unwrap();
        assert_eq!(failed["is_error"], true);
    }

    #[test]
    fn test_stop_reason_parsing() {
        let parsed: StopReason = serde_json::from_value(json!("tool_use")).unwrap();
        assert_eq!(parsed, StopReason::ToolUse);

        let unknown: StopReason = serde_json::from_value(json!("pause_turn")).unwrap();
        assert_eq!(unknown, StopReason::Other);
    }

    #[test]
    fn test_response_text_and_tool_detection() {
        let response = ChatResponse {
            content: vec![
                ContentBlock::text("Looking that up."),
                ContentBlock::ToolUse {
                    id: "toolu_1".to_string(),
                    name: "search_course_content".to_string(),
                    input: json!({"query": "retrieval"}),
                },
            ],
            model: "test".to_string(),
            stop_reason: Some(StopReason::ToolUse),
            usage: TokenUsage::default(),
        };

        assert_eq!(response.text(), "Looking that up.");
        assert!(response.wants_tools());
    }
}
