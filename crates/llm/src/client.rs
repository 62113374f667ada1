//! Chat client abstraction.
//!
//! This module defines the trait every chat provider implements. The
//! request/response types live in [`crate::types`].

use lectern_core::AppResult;

use crate::types::{ChatRequest, ChatResponse};

/// Trait for chat completion providers.
///
/// Abstracts the underlying provider (Anthropic, Ollama, etc.) behind a
/// single non-streaming call that understands tool use.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    /// Get the provider name (e.g., "anthropic", "ollama").
    fn provider_name(&self) -> &str;

    /// Perform one chat completion.
    ///
    /// # Arguments
    /// * `request` - Messages, system instructions, and optional tools
    ///
    /// # Returns
    /// The full response, including any tool-use blocks the model emitted
    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse>;
}
