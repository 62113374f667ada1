//! Lectern Core Library
//!
//! Foundational utilities shared by every lectern crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::Settings;
pub use error::{AppError, AppResult};
