//! Vector store over lancedb with separate catalog and content tables.
//!
//! The catalog table holds one row per course (metadata plus an embedded
//! title) and backs fuzzy course-name resolution and outlines. The content
//! table holds embedded chunks and backs passage search. Re-ingesting a
//! course replaces its rows in both tables, so ingestion is idempotent.

use std::path::Path;
use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
    UInt32Array,
};
use arrow_schema::{DataType, Field, Schema};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table};
use tracing::debug;

use lectern_core::{AppError, AppResult};

use crate::embed::EmbeddingProvider;
use crate::types::{CatalogEntry, Course, CourseChunk, SearchHit, SearchResults};

const CATALOG_TABLE: &str = "course_catalog";
const CONTENT_TABLE: &str = "course_content";

/// Minimum cosine similarity for a fuzzy course-name match.
const MIN_TITLE_SCORE: f32 = 0.10;

pub struct VectorStore {
    catalog: Table,
    content: Table,
    embedder: Arc<dyn EmbeddingProvider>,
    max_results: usize,
}

impl VectorStore {
    /// Open (or create) the store under `db_dir`.
    pub async fn open(
        db_dir: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        max_results: usize,
    ) -> AppResult<Self> {
        std::fs::create_dir_all(db_dir)?;
        let uri = db_dir.to_string_lossy().to_string();
        let conn = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to open database: {}", e)))?;

        let existing = conn
            .table_names()
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to list tables: {}", e)))?;

        let dim = embedder.dimensions();
        let catalog = open_or_create(&conn, CATALOG_TABLE, catalog_schema(dim), &existing).await?;
        let content = open_or_create(&conn, CONTENT_TABLE, content_schema(dim), &existing).await?;

        Ok(Self {
            catalog,
            content,
            embedder,
            max_results,
        })
    }

    /// Insert or replace a course's catalog row.
    pub async fn add_course(&self, course: &Course) -> AppResult<()> {
        let embedding = self.embedder.embed(&course.title).await?;
        let lessons_json = serde_json::to_string(&course.lessons)?;

        self.catalog
            .delete(&format!("title = '{}'", escape_literal(&course.title)))
            .await
            .map_err(|e| AppError::Store(format!("Failed to replace catalog row: {}", e)))?;

        let schema = catalog_schema(self.embedder.dimensions());
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![course.title.as_str()])),
                Arc::new(StringArray::from(vec![course.link.as_str()])),
                Arc::new(StringArray::from(vec![course.instructor.as_str()])),
                Arc::new(StringArray::from(vec![lessons_json.as_str()])),
                Arc::new(embedding_column(&[embedding], self.embedder.dimensions())),
            ],
        )
        .map_err(|e| AppError::Store(format!("Failed to build catalog batch: {}", e)))?;

        self.catalog
            .add(RecordBatchIterator::new(vec![Ok(batch)], schema))
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to add catalog row: {}", e)))?;

        debug!(course = %course.title, "Cataloged course");
        Ok(())
    }

    /// Insert chunks, replacing any existing rows for the same courses.
    pub async fn add_chunks(&self, chunks: &[CourseChunk]) -> AppResult<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let mut titles: Vec<&str> = chunks.iter().map(|c| c.course_title.as_str()).collect();
        titles.sort_unstable();
        titles.dedup();
        for title in &titles {
            self.content
                .delete(&format!("course_title = '{}'", escape_literal(title)))
                .await
                .map_err(|e| AppError::Store(format!("Failed to replace content rows: {}", e)))?;
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.embedding_text()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let ids: Vec<String> = chunks
            .iter()
            .map(|c| format!("{}-{}-{}", c.course_title, c.lesson_number, c.chunk_index))
            .collect();

        let dim = self.embedder.dimensions();
        let schema = content_schema(dim);
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(
                    ids.iter().map(String::as_str).collect::<Vec<_>>(),
                )),
                Arc::new(StringArray::from(
                    chunks
                        .iter()
                        .map(|c| c.course_title.as_str())
                        .collect::<Vec<_>>(),
                )),
                Arc::new(UInt32Array::from(
                    chunks.iter().map(|c| c.lesson_number).collect::<Vec<_>>(),
                )),
                Arc::new(UInt32Array::from(
                    chunks.iter().map(|c| c.chunk_index).collect::<Vec<_>>(),
                )),
                Arc::new(StringArray::from(
                    chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>(),
                )),
                Arc::new(embedding_column(&embeddings, dim)),
            ],
        )
        .map_err(|e| AppError::Store(format!("Failed to build content batch: {}", e)))?;

        self.content
            .add(RecordBatchIterator::new(vec![Ok(batch)], schema))
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to add content rows: {}", e)))?;

        debug!(chunks = chunks.len(), "Indexed chunks");
        Ok(())
    }

    /// Semantic search over chunk content with optional course and lesson
    /// filters. An unresolvable course name is reported inside the results,
    /// not as an error; infrastructure failures are.
    pub async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> AppResult<SearchResults> {
        let resolved = match course_name {
            Some(name) => match self.resolve_course_name(name).await? {
                Some(title) => Some(title),
                None => {
                    return Ok(SearchResults::not_found(format!(
                        "No course found matching '{}'",
                        name
                    )))
                }
            },
            None => None,
        };

        let query_vec = self.embedder.embed(query).await?;

        let mut clauses = Vec::new();
        if let Some(title) = &resolved {
            clauses.push(format!("course_title = '{}'", escape_literal(title)));
        }
        if let Some(number) = lesson_number {
            clauses.push(format!("lesson_number = {}", number));
        }

        let mut vector_query = self
            .content
            .query()
            .nearest_to(query_vec.clone())
            .map_err(|e| AppError::Store(format!("Failed to build query: {}", e)))?
            .limit(self.max_results);
        if !clauses.is_empty() {
            vector_query = vector_query.only_if(clauses.join(" AND "));
        }

        let batches: Vec<RecordBatch> = vector_query
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Search failed: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Store(format!("Failed to collect results: {}", e)))?;

        let mut hits = Vec::new();
        for batch in &batches {
            for row in 0..batch.num_rows() {
                let stored = read_vector(batch, 5, row)?;
                hits.push(SearchHit {
                    text: read_string(batch, 4, row)?,
                    course_title: read_string(batch, 1, row)?,
                    lesson_number: read_u32(batch, 2, row)?,
                    score: cosine_similarity(&query_vec, &stored),
                });
            }
        }
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(self.max_results);

        Ok(SearchResults::from_hits(hits))
    }

    /// Resolve a partial or fuzzy course name to a cataloged title.
    pub async fn resolve_course_name(&self, name: &str) -> AppResult<Option<String>> {
        let query_vec = self.embedder.embed(name).await?;
        let batches: Vec<RecordBatch> = self
            .catalog
            .query()
            .nearest_to(query_vec.clone())
            .map_err(|e| AppError::Store(format!("Failed to build query: {}", e)))?
            .limit(1)
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Course lookup failed: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Store(format!("Failed to collect results: {}", e)))?;

        for batch in &batches {
            if batch.num_rows() == 0 {
                continue;
            }
            let stored = read_vector(batch, 4, 0)?;
            let score = cosine_similarity(&query_vec, &stored);
            let title = read_string(batch, 0, 0)?;
            debug!(name, best = %title, score, "Resolved course name");
            if score >= MIN_TITLE_SCORE {
                return Ok(Some(title));
            }
        }
        Ok(None)
    }

    /// Fetch a course outline by fuzzy name.
    pub async fn outline(&self, course_name: &str) -> AppResult<Option<CatalogEntry>> {
        match self.resolve_course_name(course_name).await? {
            Some(title) => self.catalog_entry(&title).await,
            None => Ok(None),
        }
    }

    /// Link for one lesson of an exactly-titled course.
    pub async fn lesson_link(
        &self,
        course_title: &str,
        lesson_number: u32,
    ) -> AppResult<Option<String>> {
        let entry = match self.catalog_entry(course_title).await? {
            Some(entry) => entry,
            None => return Ok(None),
        };
        Ok(entry
            .lessons
            .iter()
            .find(|l| l.number == lesson_number)
            .and_then(|l| l.link.clone()))
    }

    /// Whether a course with this exact title is cataloged.
    pub async fn has_course(&self, title: &str) -> AppResult<bool> {
        let count = self
            .catalog
            .count_rows(Some(format!("title = '{}'", escape_literal(title))))
            .await
            .map_err(|e| AppError::Store(format!("Failed to count catalog rows: {}", e)))?;
        Ok(count > 0)
    }

    pub async fn course_count(&self) -> AppResult<usize> {
        self.catalog
            .count_rows(None)
            .await
            .map_err(|e| AppError::Store(format!("Failed to count courses: {}", e)))
    }

    pub async fn chunk_count(&self) -> AppResult<usize> {
        self.content
            .count_rows(None)
            .await
            .map_err(|e| AppError::Store(format!("Failed to count chunks: {}", e)))
    }

    /// All cataloged course titles.
    pub async fn course_titles(&self) -> AppResult<Vec<String>> {
        let batches: Vec<RecordBatch> = self
            .catalog
            .query()
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to scan catalog: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Store(format!("Failed to collect results: {}", e)))?;

        let mut titles = Vec::new();
        for batch in &batches {
            for row in 0..batch.num_rows() {
                titles.push(read_string(batch, 0, row)?);
            }
        }
        titles.sort();
        Ok(titles)
    }

    /// Remove all rows from both tables.
    pub async fn clear(&self) -> AppResult<()> {
        self.catalog
            .delete("title IS NOT NULL")
            .await
            .map_err(|e| AppError::Store(format!("Failed to clear catalog: {}", e)))?;
        self.content
            .delete("id IS NOT NULL")
            .await
            .map_err(|e| AppError::Store(format!("Failed to clear content: {}", e)))?;
        Ok(())
    }

    async fn catalog_entry(&self, title: &str) -> AppResult<Option<CatalogEntry>> {
        let batches: Vec<RecordBatch> = self
            .catalog
            .query()
            .only_if(format!("title = '{}'", escape_literal(title)))
            .limit(1)
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Catalog lookup failed: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Store(format!("Failed to collect results: {}", e)))?;

        for batch in &batches {
            if batch.num_rows() == 0 {
                continue;
            }
            let lessons = serde_json::from_str(&read_string(batch, 3, 0)?)?;
            return Ok(Some(CatalogEntry {
                title: read_string(batch, 0, 0)?,
                link: read_string(batch, 1, 0)?,
                instructor: read_string(batch, 2, 0)?,
                lessons,
            }));
        }
        Ok(None)
    }
}

async fn open_or_create(
    conn: &Connection,
    name: &str,
    schema: Arc<Schema>,
    existing: &[String],
) -> AppResult<Table> {
    if existing.iter().any(|t| t == name) {
        conn.open_table(name)
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to open table '{}': {}", name, e)))
    } else {
        let empty = RecordBatch::new_empty(schema.clone());
        conn.create_table(name, RecordBatchIterator::new(vec![Ok(empty)], schema))
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to create table '{}': {}", name, e)))
    }
}

fn catalog_schema(dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("title", DataType::Utf8, false),
        Field::new("link", DataType::Utf8, false),
        Field::new("instructor", DataType::Utf8, false),
        Field::new("lessons_json", DataType::Utf8, false),
        embedding_field(dim),
    ]))
}

fn content_schema(dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("course_title", DataType::Utf8, false),
        Field::new("lesson_number", DataType::UInt32, false),
        Field::new("chunk_index", DataType::UInt32, false),
        Field::new("text", DataType::Utf8, false),
        embedding_field(dim),
    ]))
}

fn embedding_field(dim: usize) -> Field {
    Field::new(
        "embedding",
        DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim as i32),
        false,
    )
}

fn embedding_column(vectors: &[Vec<f32>], dim: usize) -> FixedSizeListArray {
    let flat: Vec<f32> = vectors.iter().flatten().copied().collect();
    FixedSizeListArray::new(
        Arc::new(Field::new("item", DataType::Float32, true)),
        dim as i32,
        Arc::new(Float32Array::from(flat)),
        None,
    )
}

fn read_string(batch: &RecordBatch, column: usize, row: usize) -> AppResult<String> {
    batch
        .column(column)
        .as_any()
        .downcast_ref::<StringArray>()
        .map(|a| a.value(row).to_string())
        .ok_or_else(|| AppError::Store(format!("Column {} is not a string column", column)))
}

fn read_u32(batch: &RecordBatch, column: usize, row: usize) -> AppResult<u32> {
    batch
        .column(column)
        .as_any()
        .downcast_ref::<UInt32Array>()
        .map(|a| a.value(row))
        .ok_or_else(|| AppError::Store(format!("Column {} is not a u32 column", column)))
}

fn read_vector(batch: &RecordBatch, column: usize, row: usize) -> AppResult<Vec<f32>> {
    let list = batch
        .column(column)
        .as_any()
        .downcast_ref::<FixedSizeListArray>()
        .ok_or_else(|| AppError::Store(format!("Column {} is not a vector column", column)))?;
    let values = list.value(row);
    let floats = values
        .as_any()
        .downcast_ref::<Float32Array>()
        .ok_or_else(|| AppError::Store("Vector column does not hold f32 values".to_string()))?;
    Ok(floats.values().to_vec())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn escape_literal(s: &str) -> String {
    s.replace('\'', "''")
}
