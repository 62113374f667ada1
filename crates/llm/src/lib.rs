//! Chat model integration for the lectern service.
//!
//! This crate provides a provider-agnostic abstraction for tool-capable
//! chat completions. Providers implement a single `ChatClient` trait over
//! a shared content-block message model.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **Anthropic**: Hosted Messages API
//!
//! # Example
//! ```no_run
//! use lectern_llm::{ChatClient, ChatMessage, ChatRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new()?;
//! let request = ChatRequest::new("llama3.2")
//!     .with_message(ChatMessage::user("Hello, world!"));
//! let response = client.chat(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::ChatClient;
pub use factory::create_client;
pub use providers::{AnthropicClient, OllamaClient};
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, ContentBlock, Role, StopReason, TokenUsage,
    ToolChoice, ToolDefinition, DEFAULT_MAX_TOKENS,
};
