//! Command handlers for the lectern CLI.

pub mod ask;
pub mod chat;
pub mod courses;
pub mod ingest;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use courses::CoursesCommand;
pub use ingest::IngestCommand;

use lectern_core::{AppResult, Settings};
use lectern_llm::create_client;
use lectern_rag::embed::create_provider;
use lectern_rag::{RagConfig, RagSystem};

/// Assemble the full question-answering system from settings.
pub(crate) async fn build_system(settings: &Settings) -> AppResult<RagSystem> {
    let api_key = settings.resolve_api_key(&settings.provider);
    let client = create_client(
        &settings.provider,
        settings.endpoint.as_deref(),
        api_key.as_deref(),
    )?;
    let embedder = create_provider(
        &settings.embedding_provider,
        &settings.embedding_model,
        settings.embedding_endpoint.as_deref(),
        settings.embedding_dimensions,
    )?;

    let config = RagConfig {
        model: settings.model.clone(),
        chunk_size: settings.chunk_size,
        chunk_overlap: settings.chunk_overlap,
        max_results: settings.max_results,
        max_history: settings.max_history,
        max_tool_rounds: settings.max_tool_rounds,
        ..RagConfig::default()
    };

    RagSystem::new(config, &settings.db_dir, client, embedder).await
}
