//! Error types for the lectern service.
//!
//! This module defines a unified error enum covering every error category
//! in the application: configuration, I/O, document parsing, LLM calls,
//! vector storage, tool dispatch, and session lookup.

use thiserror::Error;

/// Unified error type for the lectern service.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Errors are represented and propagated, never panicked on.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed course document
    #[error("Parse error: {0}")]
    Parse(String),

    /// LLM provider errors (API failures, malformed responses)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Vector store and embedding errors
    #[error("Store error: {0}")]
    Store(String),

    /// Tool dispatch errors
    #[error("Tool error: {0}")]
    Tool(String),

    /// Unknown or expired session identifier
    #[error("Session error: {0}")]
    Session(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
