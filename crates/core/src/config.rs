//! Configuration management for the lectern service.
//!
//! Settings merge from multiple sources, lowest precedence first:
//! - Built-in defaults
//! - Config file (lectern.yaml)
//! - Environment variables
//! - Command-line flags (applied by the binary via [`Settings::with_overrides`])
//!
//! Components never read ambient state themselves: the CLI loads one
//! `Settings` value and passes the relevant pieces into constructors.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Process-level settings shared by every command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory of course documents to ingest
    pub documents_dir: PathBuf,

    /// Directory holding the embedded vector database
    pub db_dir: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Chat provider (e.g., "anthropic", "ollama")
    pub provider: String,

    /// Chat model identifier
    pub model: String,

    /// API key for hosted providers
    pub api_key: Option<String>,

    /// Provider endpoint override
    pub endpoint: Option<String>,

    /// Embedding provider (e.g., "hash", "ollama")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Embedding endpoint override
    pub embedding_endpoint: Option<String>,

    /// Embedding vector width
    pub embedding_dimensions: usize,

    /// Maximum characters per content chunk
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,

    /// Maximum hits returned per content search
    pub max_results: usize,

    /// Maximum messages retained per session
    pub max_history: usize,

    /// Tool-call rounds allowed before the final answer is forced
    pub max_tool_rounds: usize,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    paths: Option<PathsSection>,
    llm: Option<LlmSection>,
    embedding: Option<EmbeddingSection>,
    retrieval: Option<RetrievalSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PathsSection {
    documents: Option<String>,
    database: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    dimensions: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalSection {
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    max_results: Option<usize>,
    max_history: Option<usize>,
    max_tool_rounds: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("docs"),
            db_dir: PathBuf::from(".lectern/db"),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            api_key: None,
            endpoint: None,
            embedding_provider: "hash".to_string(),
            embedding_model: "hash-v1".to_string(),
            embedding_endpoint: None,
            embedding_dimensions: 384,
            chunk_size: 800,
            chunk_overlap: 100,
            max_results: 5,
            max_history: 10,
            max_tool_rounds: 1,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl Settings {
    /// Load settings from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `LECTERN_CONFIG`: Path to config file
    /// - `LECTERN_DOCS`: Course documents directory
    /// - `LECTERN_DB`: Vector database directory
    /// - `LECTERN_PROVIDER`: Chat provider
    /// - `LECTERN_MODEL`: Chat model identifier
    /// - `LECTERN_API_KEY`: API key for hosted providers
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut settings = Self::default();

        if let Ok(config_file) = std::env::var("LECTERN_CONFIG") {
            settings.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if it exists
        let config_path = settings
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("lectern.yaml"));

        if config_path.exists() {
            settings = settings.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(docs) = std::env::var("LECTERN_DOCS") {
            settings.documents_dir = PathBuf::from(docs);
        }

        if let Ok(db) = std::env::var("LECTERN_DB") {
            settings.db_dir = PathBuf::from(db);
        }

        if let Ok(provider) = std::env::var("LECTERN_PROVIDER") {
            settings.provider = provider;
        }

        if let Ok(model) = std::env::var("LECTERN_MODEL") {
            settings.model = model;
        }

        if let Ok(key) = std::env::var("LECTERN_API_KEY") {
            settings.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            settings.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            settings.no_color = true;
        }

        Ok(settings)
    }

    /// Merge a YAML configuration file into these settings.
    fn merge_yaml(&self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(paths) = config_file.paths {
            if let Some(documents) = paths.documents {
                result.documents_dir = PathBuf::from(documents);
            }
            if let Some(database) = paths.database {
                result.db_dir = PathBuf::from(database);
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if let Some(endpoint) = llm.endpoint {
                result.endpoint = Some(endpoint);
            }
        }

        if let Some(embedding) = config_file.embedding {
            if let Some(provider) = embedding.provider {
                result.embedding_provider = provider;
            }
            if let Some(model) = embedding.model {
                result.embedding_model = model;
            }
            if let Some(endpoint) = embedding.endpoint {
                result.embedding_endpoint = Some(endpoint);
            }
            if let Some(dimensions) = embedding.dimensions {
                result.embedding_dimensions = dimensions;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(chunk_size) = retrieval.chunk_size {
                result.chunk_size = chunk_size;
            }
            if let Some(chunk_overlap) = retrieval.chunk_overlap {
                result.chunk_overlap = chunk_overlap;
            }
            if let Some(max_results) = retrieval.max_results {
                result.max_results = max_results;
            }
            if let Some(max_history) = retrieval.max_history {
                result.max_history = max_history;
            }
            if let Some(max_tool_rounds) = retrieval.max_tool_rounds {
                result.max_tool_rounds = max_tool_rounds;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the settings.
    ///
    /// Command-line flags take precedence over environment variables
    /// and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        documents_dir: Option<PathBuf>,
        db_dir: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(documents_dir) = documents_dir {
            self.documents_dir = documents_dir;
        }

        if let Some(db_dir) = db_dir {
            self.db_dir = db_dir;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve the API key for a provider.
    ///
    /// Checks the explicit `api_key` setting first, then falls back to the
    /// provider's conventional environment variable.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let env_var = match provider {
            "anthropic" => "ANTHROPIC_API_KEY",
            "openai" => "OPENAI_API_KEY",
            _ => return None,
        };

        std::env::var(env_var).ok()
    }

    /// Validate the settings for the active providers.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["anthropic", "ollama", "openai"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        let known_embedding_providers = ["hash", "ollama"];
        if !known_embedding_providers.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                known_embedding_providers.join(", ")
            )));
        }

        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be positive".to_string()));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if self.max_results == 0 {
            return Err(AppError::Config("max_results must be positive".to_string()));
        }

        if self.max_history == 0 {
            return Err(AppError::Config("max_history must be positive".to_string()));
        }

        if self.embedding_dimensions == 0 {
            return Err(AppError::Config(
                "embedding_dimensions must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.provider, "ollama");
        assert_eq!(settings.chunk_size, 800);
        assert_eq!(settings.chunk_overlap, 100);
        assert_eq!(settings.max_results, 5);
        assert_eq!(settings.max_history, 10);
        assert_eq!(settings.max_tool_rounds, 1);
        assert!(!settings.verbose);
        assert!(!settings.no_color);
    }

    #[test]
    fn test_with_overrides() {
        let settings = Settings::default();
        let overridden = settings.with_overrides(
            Some(PathBuf::from("/tmp/docs")),
            None,
            None,
            Some("anthropic".to_string()),
            Some("claude-sonnet-4-0".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.documents_dir, PathBuf::from("/tmp/docs"));
        assert_eq!(overridden.provider, "anthropic");
        assert_eq!(overridden.model, "claude-sonnet-4-0");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let settings = Settings {
            provider: "unknown".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_overlap_exceeds_size() {
        let settings = Settings {
            chunk_size: 100,
            chunk_overlap: 100,
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("chunk_overlap"));
    }

    #[test]
    fn test_validate_defaults() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_resolve_api_key_explicit() {
        let settings = Settings {
            api_key: Some("sk-test".to_string()),
            ..Settings::default()
        };
        assert_eq!(
            settings.resolve_api_key("anthropic"),
            Some("sk-test".to_string())
        );
    }

    #[test]
    fn test_resolve_api_key_ollama_needs_none() {
        let settings = Settings::default();
        assert_eq!(settings.resolve_api_key("ollama"), None);
    }
}
