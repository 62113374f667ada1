//! Tool-mediated answer generation.
//!
//! One model call decides whether to answer directly or call tools. Tool
//! rounds are bounded by configuration: within the bound, results go back
//! to the model with the tool definitions still attached; past it, the
//! latest response is final and any further tool requests in it are
//! ignored.

use std::sync::Arc;

use tracing::{debug, warn};

use lectern_core::AppResult;
use lectern_llm::{ChatClient, ChatMessage, ChatRequest, ContentBlock, Role, ToolDefinition};

use crate::tools::ToolRegistry;

/// Instructions for the course assistant.
const SYSTEM_PROMPT: &str = "\
You are a course materials assistant with access to retrieval tools.

Available tools:
1. search_course_content: searches inside course materials. Use it for \
questions about specific course content or detailed lesson material.
2. get_course_outline: returns a course's title, link, and full lesson \
list. Use it for questions about course structure or what a course covers.

Tool usage:
- Answer general knowledge questions from your own knowledge, without tools.
- For course-specific questions, call the appropriate tool first, then \
answer from its results.
- At most one round of tool calls per query.
- If a search returns nothing relevant, say so briefly.

Responses must be brief, educational, and clear. Provide the direct answer \
only, with no meta-commentary about your search process or reasoning.";

/// Answer shown when the model produces no usable text.
const EMPTY_RESPONSE_FALLBACK: &str =
    "I was unable to generate a response. Please try rephrasing your question.";

/// Drives the chat client through the bounded tool loop.
pub struct AiGenerator {
    client: Arc<dyn ChatClient>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_tool_rounds: usize,
}

impl AiGenerator {
    pub fn new(
        client: Arc<dyn ChatClient>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
        max_tool_rounds: usize,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens,
            temperature,
            max_tool_rounds,
        }
    }

    /// Generate an answer for `query`, optionally informed by formatted
    /// conversation history and the registered tools.
    pub async fn generate(
        &self,
        query: &str,
        history: Option<&str>,
        registry: &ToolRegistry,
    ) -> AppResult<String> {
        let system = match history {
            Some(h) if !h.is_empty() => {
                format!("{}\n\nPrevious conversation:\n{}", SYSTEM_PROMPT, h)
            }
            _ => SYSTEM_PROMPT.to_string(),
        };
        let tools = registry.definitions();

        let mut messages = vec![ChatMessage::user(query)];
        let mut response = self
            .client
            .chat(&self.request(&system, messages.clone(), &tools))
            .await?;

        let mut rounds = 0;
        while response.wants_tools() && rounds < self.max_tool_rounds {
            rounds += 1;
            messages.push(ChatMessage::from_blocks(
                Role::Assistant,
                response.content.clone(),
            ));

            let mut results = Vec::new();
            for block in &response.content {
                if let ContentBlock::ToolUse { id, name, input } = block {
                    debug!(tool = %name, round = rounds, "Executing tool call");
                    match registry.execute(name, input).await {
                        Ok(output) => results.push(ContentBlock::tool_result(id.clone(), output)),
                        Err(err) => {
                            warn!(tool = %name, "Tool call failed: {}", err);
                            results.push(ContentBlock::tool_error(id.clone(), err.to_string()));
                        }
                    }
                }
            }
            if results.is_empty() {
                // Stop reason said tool_use but no call blocks came with it.
                break;
            }
            messages.push(ChatMessage::tool_results(results));

            response = self
                .client
                .chat(&self.request(&system, messages.clone(), &tools))
                .await?;
        }

        let answer = response.text();
        if answer.is_empty() {
            return Ok(EMPTY_RESPONSE_FALLBACK.to_string());
        }
        Ok(answer)
    }

    fn request(
        &self,
        system: &str,
        messages: Vec<ChatMessage>,
        tools: &[ToolDefinition],
    ) -> ChatRequest {
        ChatRequest::new(&self.model)
            .with_system(system)
            .with_messages(messages)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_tools(tools.to_vec())
    }
}
