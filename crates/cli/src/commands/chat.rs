//! Interactive chat session.

use clap::Args;
use lectern_core::{AppResult, Settings};
use std::collections::HashSet;
use std::io::Write;

/// Interactive question session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Show sources after each answer
    #[arg(long)]
    pub show_sources: bool,
}

impl ChatCommand {
    pub async fn execute(&self, settings: &Settings) -> AppResult<()> {
        tracing::info!("Starting chat session");

        let system = super::build_system(settings).await?;
        let analytics = system.analytics().await?;
        let session_id = system.create_session();

        println!(
            "Lectern chat - {} courses loaded. Ask a question ('exit' or Ctrl+D to quit).",
            analytics.total_courses
        );

        let mut line = String::new();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            line.clear();
            if std::io::stdin().read_line(&mut line)? == 0 {
                break; // EOF
            }
            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if question == "exit" || question == "quit" {
                break;
            }

            match system.query(question, Some(&session_id)).await {
                Ok(outcome) => {
                    println!("{}", outcome.answer);
                    if self.show_sources && !outcome.sources.is_empty() {
                        println!();
                        println!("Sources:");
                        let mut seen = HashSet::new();
                        for source in &outcome.sources {
                            if seen.insert(source.label()) {
                                println!("- {}", source.label());
                            }
                        }
                    }
                    println!();
                }
                Err(e) => eprintln!("Error: {}\n", e),
            }
        }

        println!("Goodbye!");
        Ok(())
    }
}
