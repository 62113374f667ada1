//! Ask command handler.

use clap::Args;
use lectern_core::{AppError, AppResult, Settings};
use std::collections::HashSet;
use std::path::PathBuf;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, settings: &Settings) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self
            .question_text()
            .ok_or_else(|| AppError::Config("No question provided".to_string()))?;

        let system = super::build_system(settings).await?;
        let outcome = system.query(&question, None).await?;

        if self.json {
            let output = serde_json::json!({
                "answer": outcome.answer,
                "sources": outcome.sources,
                "sessionId": outcome.session_id,
                "model": settings.model,
                "provider": settings.provider,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", outcome.answer);

            if !outcome.sources.is_empty() {
                println!();
                println!("Sources:");
                let mut seen = HashSet::new();
                for source in &outcome.sources {
                    if !seen.insert(source.label()) {
                        continue;
                    }
                    match &source.link {
                        Some(link) => println!("- {} ({})", source.label(), link),
                        None => println!("- {}", source.label()),
                    }
                }
            }
        }

        Ok(())
    }

    /// The question text, from the positional argument or a file.
    fn question_text(&self) -> Option<String> {
        self.question.clone().or_else(|| {
            self.file.as_ref().and_then(|path| {
                std::fs::read_to_string(path)
                    .map_err(|e| tracing::error!("Failed to read question file: {}", e))
                    .ok()
                    .map(|text| text.trim().to_string())
            })
        })
    }
}
