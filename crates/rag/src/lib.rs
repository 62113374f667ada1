//! Retrieval-augmented question answering over course documents.
//!
//! The pipeline: course documents are parsed ([`parser`]), split into
//! overlapping chunks ([`chunker`]), embedded ([`embed`]) and indexed in a
//! two-table vector store ([`store`]). At query time the model decides
//! through tool calls ([`tools`]) whether to retrieve before answering;
//! [`generator`] bounds those tool rounds and [`session`] carries
//! conversation history. [`system::RagSystem`] ties it all together.
//!
//! ```no_run
//! use std::sync::Arc;
//! use lectern_rag::{RagConfig, RagSystem};
//! use lectern_rag::embed::HashEmbedder;
//! use lectern_llm::OllamaClient;
//!
//! # async fn run() -> lectern_core::AppResult<()> {
//! let client = Arc::new(OllamaClient::new()?);
//! let embedder = Arc::new(HashEmbedder::new(384));
//! let system = RagSystem::new(
//!     RagConfig::default(),
//!     std::path::Path::new(".lectern/db"),
//!     client,
//!     embedder,
//! )
//! .await?;
//!
//! system.add_course_folder(std::path::Path::new("docs"), false).await?;
//! let outcome = system.query("What does lesson 2 cover?", None).await?;
//! println!("{}", outcome.answer);
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod embed;
pub mod generator;
pub mod parser;
pub mod session;
pub mod store;
pub mod system;
pub mod tools;
pub mod types;

pub use generator::AiGenerator;
pub use session::SessionManager;
pub use store::VectorStore;
pub use system::{Analytics, QueryOutcome, RagSystem};
pub use tools::{CourseOutlineTool, CourseSearchTool, Tool, ToolRegistry};
pub use types::{
    CatalogEntry, Course, CourseChunk, Lesson, RagConfig, SearchHit, SearchResults, Source,
};
