#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use lectern_core::{AppError, AppResult};
use lectern_llm::{ChatClient, ChatRequest, ChatResponse, ContentBlock, StopReason, TokenUsage};

/// Chat client that replays a fixed script and records every request.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<ChatResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, response: ChatResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Llm("scripted client ran out of responses".to_string()))
    }
}

pub fn text_response(text: &str) -> ChatResponse {
    ChatResponse {
        content: vec![ContentBlock::text(text)],
        model: "test".to_string(),
        stop_reason: Some(StopReason::EndTurn),
        usage: TokenUsage::default(),
    }
}

pub fn tool_call(id: &str, name: &str, input: serde_json::Value) -> ChatResponse {
    ChatResponse {
        content: vec![ContentBlock::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        }],
        model: "test".to_string(),
        stop_reason: Some(StopReason::ToolUse),
        usage: TokenUsage::default(),
    }
}

pub const RAG_DOC: &str = "\
Course Title: Building RAG Systems
Course Link: https://example.com/rag
Course Instructor: Ada Lovelace

Lesson 0: Introduction
Lesson Link: https://example.com/rag/0
Retrieval augmented generation combines search with language models.
The retriever finds relevant passages and the model answers from them.

Lesson 1: Chunking Strategies
Documents are split into overlapping chunks before embedding.
Overlap keeps context intact across chunk boundaries.
";

pub const PROMPT_DOC: &str = "\
Course Title: Advanced Prompting
Course Link: https://example.com/prompt
Course Instructor: P. Engineer

Lesson 0: Prompt Basics
Prompts steer model behavior through instructions and examples.

Lesson 1: Few-Shot Patterns
Showing worked examples improves output consistency.
";

/// Write the two fixture courses into `dir` as .txt files.
pub fn write_docs(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("rag.txt"), RAG_DOC).unwrap();
    std::fs::write(dir.join("prompting.txt"), PROMPT_DOC).unwrap();
}
