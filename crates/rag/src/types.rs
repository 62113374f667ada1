//! Domain types shared across the retrieval pipeline.

use serde::{Deserialize, Serialize};

/// Tuning knobs for ingestion, retrieval, and generation.
///
/// Constructed by the caller (typically from CLI settings) and injected into
/// [`crate::system::RagSystem`]; nothing in this crate reads configuration
/// from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Model identifier passed to the chat client.
    pub model: String,
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Maximum hits returned by a content search.
    pub max_results: usize,
    /// Maximum messages retained per conversation session.
    pub max_history: usize,
    /// Maximum tool rounds per query before forcing a final answer.
    pub max_tool_rounds: usize,
    /// Token budget for each model response.
    pub max_tokens: u32,
    /// Sampling temperature for generation.
    pub temperature: f32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            chunk_size: 800,
            chunk_overlap: 100,
            max_results: 5,
            max_history: 10,
            max_tool_rounds: 1,
            max_tokens: 800,
            temperature: 0.0,
        }
    }
}

/// A course with its ordered lesson metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub title: String,
    pub link: String,
    pub instructor: String,
    pub lessons: Vec<Lesson>,
}

/// One lesson within a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    pub number: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A chunk of lesson text carrying its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseChunk {
    pub text: String,
    pub course_title: String,
    pub lesson_number: u32,
    /// Position within the course, counted across all lessons.
    pub chunk_index: u32,
}

impl CourseChunk {
    /// Text handed to the embedder. The provenance prefix lives only in the
    /// embedded representation; the stored chunk keeps the raw text.
    pub fn embedding_text(&self) -> String {
        format!(
            "Course {} Lesson {} content: {}",
            self.course_title, self.lesson_number, self.text
        )
    }
}

/// Catalog record for one course, read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub link: String,
    pub instructor: String,
    pub lessons: Vec<Lesson>,
}

impl From<&Course> for CatalogEntry {
    fn from(course: &Course) -> Self {
        Self {
            title: course.title.clone(),
            link: course.link.clone(),
            instructor: course.instructor.clone(),
            lessons: course.lessons.clone(),
        }
    }
}

/// One scored passage returned by a content search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub text: String,
    pub course_title: String,
    pub lesson_number: u32,
    pub score: f32,
}

/// Outcome of a content search.
///
/// An unresolved course filter sets `error`; `hits` is empty in that case so
/// callers never see both results and an error at once. An empty `hits` with
/// no `error` means the search ran and found nothing.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub error: Option<String>,
}

impl SearchResults {
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        Self { hits, error: None }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            hits: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Provenance entry surfaced alongside an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub course_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Source {
    /// Human-readable label, e.g. `Building RAG Systems - Lesson 3`.
    pub fn label(&self) -> String {
        match self.lesson_number {
            Some(number) => format!("{} - Lesson {}", self.course_title, number),
            None => self.course_title.clone(),
        }
    }
}
