//! Ingest command handler.

use clap::Args;
use lectern_core::{AppResult, Settings};
use std::path::PathBuf;

/// Ingest course documents into the vector store
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// A course document or folder (defaults to the documents directory)
    pub path: Option<PathBuf>,

    /// Clear existing course data before ingesting
    #[arg(long)]
    pub clear: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, settings: &Settings) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        let system = super::build_system(settings).await?;

        let (courses, chunks) = match &self.path {
            Some(path) if path.is_file() => {
                let (course, count) = system.add_course_document(path).await?;
                tracing::debug!("Replaced course '{}'", course.title);
                (1, count)
            }
            Some(path) => system.add_course_folder(path, self.clear).await?,
            None => {
                system
                    .add_course_folder(&settings.documents_dir, self.clear)
                    .await?
            }
        };

        let analytics = system.analytics().await?;

        if self.json {
            let output = serde_json::json!({
                "coursesAdded": courses,
                "chunksAdded": chunks,
                "totalCourses": analytics.total_courses,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Ingested {} courses ({} chunks)", courses, chunks);
            println!("Total courses in catalog: {}", analytics.total_courses);
        }

        Ok(())
    }
}
