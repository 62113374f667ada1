//! End-to-end query behavior: the tool round against a real store, source
//! tracking, and session history.

mod common;

use std::sync::Arc;

use serde_json::json;

use lectern_core::AppError;
use lectern_llm::ContentBlock;
use lectern_rag::embed::HashEmbedder;
use lectern_rag::{RagConfig, RagSystem};

use common::{text_response, tool_call, write_docs, ScriptedClient};

async fn loaded_system(
    root: &std::path::Path,
    client: Arc<ScriptedClient>,
    config: RagConfig,
) -> RagSystem {
    let docs = root.join("docs");
    write_docs(&docs);
    let system = RagSystem::new(
        config,
        &root.join("db"),
        client,
        Arc::new(HashEmbedder::new(128)),
    )
    .await
    .unwrap();
    system.add_course_folder(&docs, false).await.unwrap();
    system
}

fn tool_result_content(request: &lectern_llm::ChatRequest) -> (String, bool) {
    match &request.messages[2].content[0] {
        ContentBlock::ToolResult {
            content, is_error, ..
        } => (content.clone(), *is_error),
        other => panic!("expected tool result block, got {:?}", other),
    }
}

#[tokio::test]
async fn general_question_answers_without_retrieval() {
    let root = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(vec![text_response("2 + 2 = 4.")]);
    let system = loaded_system(root.path(), client.clone(), RagConfig::default()).await;

    let outcome = system.query("What is 2 + 2?", None).await.unwrap();

    assert_eq!(outcome.answer, "2 + 2 = 4.");
    assert!(outcome.sources.is_empty());
    assert!(!outcome.session_id.is_empty());

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    // Both tools were offered; the model just declined them.
    assert_eq!(requests[0].tools.len(), 2);
    assert_eq!(requests[0].tools[0].name, "search_course_content");
    assert_eq!(requests[0].tools[1].name, "get_course_outline");
}

#[tokio::test]
async fn content_question_runs_one_search_round() {
    let root = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(vec![
        tool_call(
            "toolu_1",
            "search_course_content",
            json!({"query": "chunk overlap", "course_name": "RAG"}),
        ),
        text_response("Chunks share 100 characters of overlap."),
    ]);
    let system = loaded_system(root.path(), client.clone(), RagConfig::default()).await;

    let outcome = system
        .query("How much do chunks overlap in the RAG course?", None)
        .await
        .unwrap();

    assert_eq!(outcome.answer, "Chunks share 100 characters of overlap.");
    assert!(!outcome.sources.is_empty());
    assert_eq!(outcome.sources[0].course_title, "Building RAG Systems");

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    let (content, is_error) = tool_result_content(&requests[1]);
    assert!(!is_error);
    assert!(content.contains("[Building RAG Systems - Lesson"));
    // Tools stay available on the follow-up call.
    assert_eq!(requests[1].tools.len(), 2);
}

#[tokio::test]
async fn sources_do_not_leak_into_the_next_query() {
    let root = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(vec![
        tool_call(
            "toolu_1",
            "search_course_content",
            json!({"query": "overlapping chunks"}),
        ),
        text_response("Overlap preserves context."),
        text_response("You're welcome."),
    ]);
    let system = loaded_system(root.path(), client.clone(), RagConfig::default()).await;

    let first = system.query("Tell me about chunking.", None).await.unwrap();
    assert!(!first.sources.is_empty());

    let second = system
        .query("Thanks!", Some(&first.session_id))
        .await
        .unwrap();
    assert_eq!(second.answer, "You're welcome.");
    assert!(second.sources.is_empty());
    assert_eq!(second.session_id, first.session_id);
}

#[tokio::test]
async fn follow_up_queries_carry_history() {
    let root = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(vec![
        text_response("RAG retrieves then generates."),
        text_response("Yes, that is the core idea."),
    ]);
    let system = loaded_system(root.path(), client.clone(), RagConfig::default()).await;

    let session_id = system.create_session();
    system
        .query("What is RAG?", Some(&session_id))
        .await
        .unwrap();
    system
        .query("So retrieval comes first?", Some(&session_id))
        .await
        .unwrap();

    let requests = client.requests();
    let first_system = requests[0].system.clone().unwrap();
    assert!(!first_system.contains("Previous conversation:"));

    let second_system = requests[1].system.clone().unwrap();
    assert!(second_system.contains("Previous conversation:"));
    assert!(second_system.contains("User: What is RAG?"));
    assert!(second_system.contains("Assistant: RAG retrieves then generates."));
}

#[tokio::test]
async fn history_window_evicts_oldest_exchanges() {
    let root = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(vec![]);
    for i in 0..4 {
        client.push(text_response(&format!("answer-{}", i)));
    }
    let config = RagConfig {
        max_history: 4,
        ..RagConfig::default()
    };
    let system = loaded_system(root.path(), client.clone(), config).await;

    let session_id = system.create_session();
    for i in 0..4 {
        system
            .query(&format!("question-{}", i), Some(&session_id))
            .await
            .unwrap();
    }

    // The fourth request sees only the two most recent exchanges.
    let last_system = client.requests()[3].system.clone().unwrap();
    assert!(last_system.contains("question-1"));
    assert!(last_system.contains("question-2"));
    assert!(!last_system.contains("question-0"));
    assert!(!last_system.contains("answer-0"));
}

#[tokio::test]
async fn unknown_session_id_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(vec![]);
    let system = loaded_system(root.path(), client.clone(), RagConfig::default()).await;

    let err = system
        .query("hello", Some("no-such-session"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Session(_)));
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn outline_request_reaches_the_model_with_lesson_list() {
    let root = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(vec![
        tool_call(
            "toolu_1",
            "get_course_outline",
            json!({"course_name": "Building RAG"}),
        ),
        text_response("The course has two lessons."),
    ]);
    let system = loaded_system(root.path(), client.clone(), RagConfig::default()).await;

    let outcome = system
        .query("What does the RAG course cover?", None)
        .await
        .unwrap();

    assert_eq!(outcome.answer, "The course has two lessons.");
    assert_eq!(outcome.sources.len(), 1);
    assert_eq!(outcome.sources[0].lesson_number, None);
    assert_eq!(
        outcome.sources[0].link.as_deref(),
        Some("https://example.com/rag")
    );

    let (content, is_error) = tool_result_content(&client.requests()[1]);
    assert!(!is_error);
    assert!(content.contains("Course Title: Building RAG Systems"));
    assert!(content.contains("Lesson 0: Introduction"));
    assert!(content.contains("Lesson 1: Chunking Strategies"));
}

#[tokio::test]
async fn unknown_course_is_reported_inside_the_tool_result() {
    let root = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(vec![
        tool_call(
            "toolu_1",
            "search_course_content",
            json!({"query": "souffle", "course_name": "Cooking with Gas"}),
        ),
        text_response("I don't have that course."),
    ]);
    let system = loaded_system(root.path(), client.clone(), RagConfig::default()).await;

    let outcome = system
        .query("What does the cooking course say about souffles?", None)
        .await
        .unwrap();

    assert_eq!(outcome.answer, "I don't have that course.");
    assert!(outcome.sources.is_empty());

    let (content, is_error) = tool_result_content(&client.requests()[1]);
    assert!(!is_error);
    assert_eq!(content, "No course found matching 'Cooking with Gas'");
}
