//! Ingestion behavior through the assembled system: folder loading,
//! duplicate handling, and analytics.

mod common;

use std::sync::Arc;

use lectern_rag::embed::HashEmbedder;
use lectern_rag::{RagConfig, RagSystem};

use common::{write_docs, ScriptedClient};

async fn system_at(root: &std::path::Path) -> (RagSystem, Arc<ScriptedClient>) {
    let client = ScriptedClient::new(vec![]);
    let system = RagSystem::new(
        RagConfig::default(),
        &root.join("db"),
        client.clone(),
        Arc::new(HashEmbedder::new(128)),
    )
    .await
    .unwrap();
    (system, client)
}

#[tokio::test]
async fn folder_ingest_loads_every_course() {
    let root = tempfile::tempdir().unwrap();
    let docs = root.path().join("docs");
    write_docs(&docs);

    let (system, client) = system_at(root.path()).await;
    let (courses, chunks) = system.add_course_folder(&docs, false).await.unwrap();
    assert_eq!(courses, 2);
    assert!(chunks >= 4);

    let analytics = system.analytics().await.unwrap();
    assert_eq!(analytics.total_courses, 2);
    assert_eq!(
        analytics.course_titles,
        vec![
            "Advanced Prompting".to_string(),
            "Building RAG Systems".to_string()
        ]
    );

    // Ingestion never talks to the model.
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn second_ingest_skips_cataloged_courses() {
    let root = tempfile::tempdir().unwrap();
    let docs = root.path().join("docs");
    write_docs(&docs);

    let (system, _client) = system_at(root.path()).await;
    let (first_courses, first_chunks) = system.add_course_folder(&docs, false).await.unwrap();
    let (second_courses, second_chunks) = system.add_course_folder(&docs, false).await.unwrap();

    assert_eq!(first_courses, 2);
    assert!(first_chunks > 0);
    assert_eq!(second_courses, 0);
    assert_eq!(second_chunks, 0);
    assert_eq!(system.analytics().await.unwrap().total_courses, 2);
}

#[tokio::test]
async fn clear_flag_rebuilds_the_index() {
    let root = tempfile::tempdir().unwrap();
    let docs = root.path().join("docs");
    write_docs(&docs);

    let (system, _client) = system_at(root.path()).await;
    system.add_course_folder(&docs, false).await.unwrap();
    let (courses, chunks) = system.add_course_folder(&docs, true).await.unwrap();

    assert_eq!(courses, 2);
    assert!(chunks > 0);
    assert_eq!(system.analytics().await.unwrap().total_courses, 2);
}

#[tokio::test]
async fn malformed_documents_are_skipped() {
    let root = tempfile::tempdir().unwrap();
    let docs = root.path().join("docs");
    write_docs(&docs);
    std::fs::write(docs.join("broken.txt"), "This file has no course header.\n").unwrap();

    let (system, _client) = system_at(root.path()).await;
    let (courses, _) = system.add_course_folder(&docs, false).await.unwrap();
    assert_eq!(courses, 2);
    assert_eq!(system.analytics().await.unwrap().total_courses, 2);
}

#[tokio::test]
async fn non_course_extensions_are_ignored() {
    let root = tempfile::tempdir().unwrap();
    let docs = root.path().join("docs");
    write_docs(&docs);
    std::fs::write(docs.join("slides.pdf"), "binary-ish").unwrap();
    std::fs::write(docs.join("README"), "no extension").unwrap();

    let (system, _client) = system_at(root.path()).await;
    let (courses, _) = system.add_course_folder(&docs, false).await.unwrap();
    assert_eq!(courses, 2);
}

#[tokio::test]
async fn reingesting_one_document_does_not_duplicate() {
    let root = tempfile::tempdir().unwrap();
    let docs = root.path().join("docs");
    write_docs(&docs);
    let path = docs.join("rag.txt");

    let (system, _client) = system_at(root.path()).await;
    let (course_a, chunks_a) = system.add_course_document(&path).await.unwrap();
    let (course_b, chunks_b) = system.add_course_document(&path).await.unwrap();

    assert_eq!(course_a.title, "Building RAG Systems");
    assert_eq!(course_a, course_b);
    assert_eq!(chunks_a, chunks_b);
    assert_eq!(system.analytics().await.unwrap().total_courses, 1);
}

#[tokio::test]
async fn missing_folder_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let (system, _client) = system_at(root.path()).await;
    let missing = root.path().join("nope");
    assert!(system.add_course_folder(&missing, false).await.is_err());
}
