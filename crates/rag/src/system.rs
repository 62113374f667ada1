//! Wiring of the retrieval pipeline.
//!
//! `RagSystem` owns the store, tools, generator, and sessions, and exposes
//! the operations the CLI drives: ingestion, querying, and analytics. All
//! configuration arrives through [`RagConfig`]; nothing here touches the
//! environment.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use lectern_core::AppResult;
use lectern_llm::ChatClient;

use crate::chunker::chunk_course;
use crate::embed::EmbeddingProvider;
use crate::generator::AiGenerator;
use crate::parser::parse_course_file;
use crate::session::SessionManager;
use crate::store::VectorStore;
use crate::tools::{CourseOutlineTool, CourseSearchTool, ToolRegistry};
use crate::types::{Course, RagConfig, Source};

/// Answer plus provenance for one query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub answer: String,
    pub sources: Vec<Source>,
    pub session_id: String,
}

/// Course statistics for the analytics surface.
#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}

/// The assembled question-answering system.
pub struct RagSystem {
    config: RagConfig,
    store: Arc<VectorStore>,
    registry: ToolRegistry,
    generator: AiGenerator,
    sessions: SessionManager,
}

impl RagSystem {
    pub async fn new(
        config: RagConfig,
        db_dir: &Path,
        client: Arc<dyn ChatClient>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        let store = Arc::new(VectorStore::open(db_dir, embedder, config.max_results).await?);

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CourseSearchTool::new(store.clone())));
        registry.register(Arc::new(CourseOutlineTool::new(store.clone())));

        let generator = AiGenerator::new(
            client,
            config.model.clone(),
            config.max_tokens,
            config.temperature,
            config.max_tool_rounds,
        );
        let sessions = SessionManager::new(config.max_history);

        Ok(Self {
            config,
            store,
            registry,
            generator,
            sessions,
        })
    }

    /// Start a new conversation and return its session id.
    pub fn create_session(&self) -> String {
        self.sessions.create_session()
    }

    /// Answer a question. With no session id a fresh session is created;
    /// an unknown id is an error, since its history is gone.
    pub async fn query(&self, question: &str, session_id: Option<&str>) -> AppResult<QueryOutcome> {
        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => self.sessions.create_session(),
        };
        let history = self.sessions.formatted_history(&session_id)?;

        self.registry.reset_sources();
        let answer = self
            .generator
            .generate(question, history.as_deref(), &self.registry)
            .await?;
        let sources = self.registry.last_sources();

        self.sessions.add_exchange(&session_id, question, &answer);

        Ok(QueryOutcome {
            answer,
            sources,
            session_id,
        })
    }

    /// Ingest one course document, replacing any previous version of the
    /// same course.
    pub async fn add_course_document(&self, path: &Path) -> AppResult<(Course, usize)> {
        let parsed = parse_course_file(path)?;
        let chunks = chunk_course(&parsed, self.config.chunk_size, self.config.chunk_overlap);
        self.store.add_course(&parsed.course).await?;
        self.store.add_chunks(&chunks).await?;
        info!(
            course = %parsed.course.title,
            chunks = chunks.len(),
            "Ingested course document"
        );
        Ok((parsed.course, chunks.len()))
    }

    /// Ingest every course file in a folder, skipping already-cataloged
    /// titles. Returns `(courses_added, chunks_added)`.
    pub async fn add_course_folder(
        &self,
        dir: &Path,
        clear_existing: bool,
    ) -> AppResult<(usize, usize)> {
        if clear_existing {
            info!("Clearing existing course data");
            self.store.clear().await?;
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_course_file(path))
            .collect();
        paths.sort();

        let mut courses_added = 0;
        let mut chunks_added = 0;
        for path in paths {
            match parse_course_file(&path) {
                Ok(parsed) => {
                    if self.store.has_course(&parsed.course.title).await? {
                        debug!(course = %parsed.course.title, "Already cataloged, skipping");
                        continue;
                    }
                    let chunks =
                        chunk_course(&parsed, self.config.chunk_size, self.config.chunk_overlap);
                    self.store.add_course(&parsed.course).await?;
                    self.store.add_chunks(&chunks).await?;
                    info!(
                        course = %parsed.course.title,
                        chunks = chunks.len(),
                        "Ingested course"
                    );
                    courses_added += 1;
                    chunks_added += chunks.len();
                }
                Err(err) => warn!("Skipping {}: {}", path.display(), err),
            }
        }
        Ok((courses_added, chunks_added))
    }

    /// Course statistics.
    pub async fn analytics(&self) -> AppResult<Analytics> {
        Ok(Analytics {
            total_courses: self.store.course_count().await?,
            course_titles: self.store.course_titles().await?,
        })
    }
}

fn is_course_file(path: &Path) -> bool {
    path.is_file()
        && matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("txt") | Some("md")
        )
}
