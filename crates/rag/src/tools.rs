//! Tools the model can invoke during generation.
//!
//! Each tool exposes a name, a JSON schema for its input, and an async
//! execute returning plain text for the model. Tools that surface content
//! also record the sources behind their latest execution so the caller can
//! attach provenance to the final answer.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use lectern_core::{AppError, AppResult};
use lectern_llm::ToolDefinition;

use crate::store::VectorStore;
use crate::types::Source;

/// A capability the model may invoke by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn input_schema(&self) -> Value;

    async fn execute(&self, input: &Value) -> AppResult<String>;

    /// Sources recorded by the most recent execution, if any.
    fn last_sources(&self) -> Vec<Source> {
        Vec::new()
    }

    fn reset_sources(&self) {}

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Name-keyed dispatch over registered tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any previous tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn find(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Definitions for every registered tool, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Execute a tool by name. Unknown names fail with a tool error so the
    /// model sees what went wrong instead of the caller.
    pub async fn execute(&self, name: &str, input: &Value) -> AppResult<String> {
        match self.find(name) {
            Some(tool) => tool.execute(input).await,
            None => Err(AppError::Tool(format!("Tool '{}' not found", name))),
        }
    }

    /// Sources from the most recent tool execution that recorded any.
    pub fn last_sources(&self) -> Vec<Source> {
        for tool in &self.tools {
            let sources = tool.last_sources();
            if !sources.is_empty() {
                return sources;
            }
        }
        Vec::new()
    }

    pub fn reset_sources(&self) {
        for tool in &self.tools {
            tool.reset_sources();
        }
    }
}

/// Semantic search over course content with optional course and lesson
/// filters.
pub struct CourseSearchTool {
    store: Arc<VectorStore>,
    last_sources: Mutex<Vec<Source>>,
}

impl CourseSearchTool {
    pub fn new(store: Arc<VectorStore>) -> Self {
        Self {
            store,
            last_sources: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn name(&self) -> &str {
        "search_course_content"
    }

    fn description(&self) -> &str {
        "Search course materials with smart course name matching and lesson filtering"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for in the course content"
                },
                "course_name": {
                    "type": "string",
                    "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                },
                "lesson_number": {
                    "type": "integer",
                    "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: &Value) -> AppResult<String> {
        let query = input
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::Tool("search_course_content requires a 'query' parameter".to_string())
            })?;
        let course_name = input.get("course_name").and_then(Value::as_str);
        let lesson_number = input
            .get("lesson_number")
            .and_then(Value::as_u64)
            .map(|n| n as u32);

        let results = self.store.search(query, course_name, lesson_number).await?;

        if let Some(message) = results.error {
            *self.last_sources.lock().unwrap() = Vec::new();
            return Ok(message);
        }

        if results.is_empty() {
            *self.last_sources.lock().unwrap() = Vec::new();
            let mut filter_info = String::new();
            if let Some(name) = course_name {
                filter_info.push_str(&format!(" in course '{}'", name));
            }
            if let Some(number) = lesson_number {
                filter_info.push_str(&format!(" in lesson {}", number));
            }
            return Ok(format!("No relevant content found{}.", filter_info));
        }

        let mut sources = Vec::with_capacity(results.hits.len());
        let mut formatted = Vec::with_capacity(results.hits.len());
        for hit in &results.hits {
            formatted.push(format!(
                "[{} - Lesson {}]\n{}",
                hit.course_title, hit.lesson_number, hit.text
            ));
            let link = self
                .store
                .lesson_link(&hit.course_title, hit.lesson_number)
                .await?;
            sources.push(Source {
                course_title: hit.course_title.clone(),
                lesson_number: Some(hit.lesson_number),
                link,
            });
        }
        *self.last_sources.lock().unwrap() = sources;

        Ok(formatted.join("\n\n"))
    }

    fn last_sources(&self) -> Vec<Source> {
        self.last_sources.lock().unwrap().clone()
    }

    fn reset_sources(&self) {
        self.last_sources.lock().unwrap().clear();
    }
}

/// Returns a course outline: title, link, and the numbered lesson list.
pub struct CourseOutlineTool {
    store: Arc<VectorStore>,
    last_sources: Mutex<Vec<Source>>,
}

impl CourseOutlineTool {
    pub fn new(store: Arc<VectorStore>) -> Self {
        Self {
            store,
            last_sources: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn name(&self) -> &str {
        "get_course_outline"
    }

    fn description(&self) -> &str {
        "Get the outline of a course: its title, link, and complete numbered lesson list"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "course_name": {
                    "type": "string",
                    "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                }
            },
            "required": ["course_name"]
        })
    }

    async fn execute(&self, input: &Value) -> AppResult<String> {
        let course_name = input
            .get("course_name")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::Tool("get_course_outline requires a 'course_name' parameter".to_string())
            })?;

        let entry = match self.store.outline(course_name).await? {
            Some(entry) => entry,
            None => {
                *self.last_sources.lock().unwrap() = Vec::new();
                return Ok(format!("No course found matching '{}'", course_name));
            }
        };

        let mut out = format!("Course Title: {}\nCourse Link: {}\n", entry.title, entry.link);
        if !entry.lessons.is_empty() {
            out.push('\n');
            for lesson in &entry.lessons {
                out.push_str(&format!("Lesson {}: {}\n", lesson.number, lesson.title));
            }
        }

        *self.last_sources.lock().unwrap() = vec![Source {
            course_title: entry.title.clone(),
            lesson_number: None,
            link: Some(entry.link.clone()),
        }];

        Ok(out)
    }

    fn last_sources(&self) -> Vec<Source> {
        self.last_sources.lock().unwrap().clone()
    }

    fn reset_sources(&self) {
        self.last_sources.lock().unwrap().clear();
    }
}
