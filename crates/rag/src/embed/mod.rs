//! Embedding providers.
//!
//! The store embeds course titles and chunk text through this trait; the
//! default `hash` provider is deterministic and fully offline, while the
//! `ollama` provider calls a local Ollama server.

pub mod hash;
pub mod ollama;

use std::sync::Arc;

use lectern_core::{AppError, AppResult};

pub use hash::HashEmbedder;
pub use ollama::OllamaEmbedder;

/// Produces fixed-width embedding vectors for text.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;

    /// Width of every vector this provider returns.
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts, preserving order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let batch = [text.to_string()];
        let mut vectors = self.embed_batch(&batch).await?;
        vectors
            .pop()
            .ok_or_else(|| AppError::Store("embedding provider returned no vector".to_string()))
    }
}

/// Build an embedding provider by name.
pub fn create_provider(
    provider: &str,
    model: &str,
    endpoint: Option<&str>,
    dimensions: usize,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider {
        "hash" => Ok(Arc::new(HashEmbedder::new(dimensions))),
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(model, endpoint, dimensions)?)),
        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: hash, ollama",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_hash_provider() {
        let provider = create_provider("hash", "hash-v1", None, 128).unwrap();
        assert_eq!(provider.provider_name(), "hash");
        assert_eq!(provider.dimensions(), 128);
    }

    #[test]
    fn factory_rejects_unknown_provider() {
        let err = create_provider("word2vec", "m", None, 128).unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }
}
