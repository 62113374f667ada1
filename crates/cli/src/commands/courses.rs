//! Courses command handler.

use clap::Args;
use lectern_core::{AppResult, Settings};

/// List ingested courses
#[derive(Args, Debug)]
pub struct CoursesCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CoursesCommand {
    pub async fn execute(&self, settings: &Settings) -> AppResult<()> {
        tracing::info!("Executing courses command");

        let system = super::build_system(settings).await?;
        let analytics = system.analytics().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&analytics)?);
        } else if analytics.course_titles.is_empty() {
            println!("No courses ingested yet. Run 'lectern ingest' first.");
        } else {
            println!("Courses ({}):", analytics.total_courses);
            for title in &analytics.course_titles {
                println!("- {}", title);
            }
        }

        Ok(())
    }
}
