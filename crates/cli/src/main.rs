//! Lectern CLI
//!
//! Command-line front end for the course materials assistant: ingest
//! documents, ask one-off questions, or hold an interactive session.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, CoursesCommand, IngestCommand};
use lectern_core::{logging, AppResult, Settings};
use std::path::PathBuf;

/// Lectern - retrieval-augmented Q&A over course materials
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(about = "Ask questions about your course materials", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory of course documents
    #[arg(short, long, global = true, env = "LECTERN_DOCS")]
    docs: Option<PathBuf>,

    /// Directory holding the vector database
    #[arg(long, global = true, env = "LECTERN_DB")]
    db: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "LECTERN_CONFIG")]
    config: Option<PathBuf>,

    /// LLM provider (anthropic, ollama, openai)
    #[arg(short, long, global = true, env = "LECTERN_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "LECTERN_MODEL")]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest course documents into the vector store
    Ingest(IngestCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Interactive question session
    Chat(ChatCommand),

    /// List ingested courses
    Courses(CoursesCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Load base configuration, then apply CLI overrides
    let settings = Settings::load()?.with_overrides(
        cli.docs,
        cli.db,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );
    settings.validate()?;

    logging::init_logging(settings.log_level.as_deref(), settings.no_color)?;

    tracing::debug!("Documents: {:?}", settings.documents_dir);
    tracing::debug!("Database: {:?}", settings.db_dir);
    tracing::debug!("Provider: {}", settings.provider);
    tracing::debug!("Model: {}", settings.model);

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Courses(_) => "courses",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&settings).await,
        Commands::Ask(cmd) => cmd.execute(&settings).await,
        Commands::Chat(cmd) => cmd.execute(&settings).await,
        Commands::Courses(cmd) => cmd.execute(&settings).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
