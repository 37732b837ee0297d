//! Question answering pipeline with fake collaborators

mod common;

use common::{raw, service, FakeEmbedder, FakeGenerator, FakeIndex};
use legal_mitra::assistant::{
    AskRequest, HealthReport, HealthStatus, LegalAssistant, RetrieveRequest, NO_RESULTS_ANSWER,
};
use legal_mitra::config::Config;
use legal_mitra::embedding::{EmbeddingError, EmbeddingProvider};
use legal_mitra::MitraError;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

/// Remembers which thread ran the embedding
#[derive(Default)]
struct ThreadRecordingEmbedder {
    thread: Mutex<Option<ThreadId>>,
}

impl EmbeddingProvider for ThreadRecordingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        *self.thread.lock().unwrap() = Some(thread::current().id());
        FakeEmbedder.embed(text)
    }

    fn dimension(&self) -> usize {
        4
    }

    fn model_name(&self) -> &str {
        "recording-embedder"
    }
}

struct CrashingEmbedder;

impl EmbeddingProvider for CrashingEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        panic!("model runtime crashed");
    }

    fn dimension(&self) -> usize {
        4
    }

    fn model_name(&self) -> &str {
        "crashing-embedder"
    }
}

fn assistant(index: FakeIndex) -> LegalAssistant<FakeIndex, FakeGenerator> {
    assistant_with(Arc::new(FakeEmbedder), index)
}

fn assistant_with(
    embedder: Arc<dyn EmbeddingProvider>,
    index: FakeIndex,
) -> LegalAssistant<FakeIndex, FakeGenerator> {
    let config = Config::default();
    LegalAssistant::new(
        embedder,
        service(index),
        FakeGenerator,
        config.retrieval,
        config.query,
    )
}

fn theft_index() -> FakeIndex {
    let mut unnamed = raw("ipc-379", "", "", 0.7);
    unnamed.metadata.text_preview = "Punishment for theft".to_string();

    FakeIndex::new()
        .with_partition(
            "ipc",
            vec![raw("ipc-378", "Indian Penal Code", "378", 0.9), unnamed],
        )
        .with_partition(
            "bns",
            vec![raw("bns-303", "Bharatiya Nyaya Sanhita", "303", 0.8)],
        )
}

#[tokio::test]
async fn test_ask_returns_answer_with_sources() {
    let mitra = assistant(theft_index());

    let response = mitra
        .ask(AskRequest::new("  What is theft under the IPC?  "))
        .await
        .unwrap();

    assert_eq!(response.question, "What is theft under the IPC?");
    assert_eq!(response.answer, "2 documents for: What is theft under the IPC?");
    assert_eq!(response.metadata.retrieved_count, 2);
    assert_eq!(response.metadata.model_used.as_deref(), Some("fake-llm"));

    assert_eq!(response.sources.len(), 2);
    let first = &response.sources[0];
    assert_eq!(first.act_name, "Indian Penal Code");
    assert_eq!(first.section_number, "378");
    assert_eq!(first.namespace, "ipc");
    assert_eq!(first.score, 0.9);

    let second = &response.sources[1];
    assert_eq!(second.act_name, "Unknown");
    assert_eq!(second.section_number, "N/A");
    assert_eq!(second.text_preview, "Punishment for theft");
}

#[tokio::test]
async fn test_ask_without_sources() {
    let mitra = assistant(theft_index());

    let mut request = AskRequest::new("What is theft under the IPC?");
    request.include_sources = false;
    let response = mitra.ask(request).await.unwrap();

    assert!(response.sources.is_empty());
    assert_eq!(response.metadata.retrieved_count, 2);
}

#[tokio::test]
async fn test_ask_with_nothing_above_threshold() {
    let mitra = assistant(
        FakeIndex::new().with_partition("ipc", vec![raw("ipc-1", "Indian Penal Code", "1", 0.2)]),
    );

    let response = mitra
        .ask(AskRequest::new("Can my landlord evict me?"))
        .await
        .unwrap();

    assert_eq!(response.answer, NO_RESULTS_ANSWER);
    assert!(response.sources.is_empty());
    assert_eq!(response.metadata.retrieved_count, 0);
    assert!(response.metadata.model_used.is_none());
}

#[tokio::test]
async fn test_question_length_limits() {
    let mitra = assistant(theft_index());

    let err = mitra.ask(AskRequest::new("  IPC  ")).await.unwrap_err();
    assert!(matches!(err, MitraError::InvalidQuestion(_)));

    let err = mitra.ask(AskRequest::new("a".repeat(501))).await.unwrap_err();
    assert!(matches!(err, MitraError::InvalidQuestion(_)));
    assert!(mitra.retrieval().index().queried().is_empty());

    assert!(mitra.ask(AskRequest::new("a".repeat(500))).await.is_ok());
    assert!(!mitra.retrieval().index().queried().is_empty());
}

#[tokio::test]
async fn test_out_of_range_top_k_uses_default() {
    let matches = (0..12)
        .map(|i| raw(&format!("ipc-{}", i), "Indian Penal Code", &format!("{}", 300 + i), 0.8))
        .collect();
    let mitra = assistant(FakeIndex::new().with_partition("ipc", matches));

    for (requested, expected) in [(Some(3), 3), (Some(0), 7), (Some(11), 7), (None, 7)] {
        let mut request = AskRequest::new("Offences under the IPC");
        request.top_k = requested;
        let response = mitra.ask(request).await.unwrap();
        assert_eq!(response.sources.len(), expected, "top_k {:?}", requested);
    }
}

#[tokio::test]
async fn test_ask_with_explicit_namespaces() {
    let mitra = assistant(theft_index());

    let mut request = AskRequest::new("What is theft under the IPC?");
    request.namespaces = Some(vec!["bns".to_string()]);
    let response = mitra.ask(request).await.unwrap();

    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.sources[0].namespace, "bns");
}

#[tokio::test]
async fn test_retrieve_only() {
    let mitra = assistant(theft_index());

    let response = mitra
        .retrieve_only(RetrieveRequest {
            question: "Section 303 of the BNS".to_string(),
            top_k: Some(5),
            namespaces: None,
        })
        .await
        .unwrap();

    assert_eq!(response.retrieved_count, 1);
    assert_eq!(response.documents[0].id, "bns-303");
    assert!(response.documents[0].is_target_section);

    let err = mitra
        .retrieve_only(RetrieveRequest {
            question: "   ".to_string(),
            top_k: None,
            namespaces: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MitraError::InvalidQuestion(_)));
}

#[tokio::test]
async fn test_namespaces_report() {
    let mitra = assistant(theft_index());
    let report = mitra.namespaces().await;

    assert_eq!(report.total_namespaces, 2);
    assert_eq!(report.namespaces, vec!["bns", "ipc"]);
    assert_eq!(report.details["ipc"].vector_count, 2);

    let mitra = assistant(theft_index().without_listing().without_stats());
    let report = mitra.namespaces().await;
    assert_eq!(report.total_namespaces, 8);
    assert!(report.details.is_empty());
}

#[tokio::test]
async fn test_health_report() {
    let report = assistant(theft_index()).health().await;
    assert_eq!(report.status, HealthStatus::Healthy);
    assert_eq!(report.total_vectors, Some(3));
    assert_eq!(report.embedding_model, "fake-embedder");
    assert_eq!(report.llm_model, "fake-llm");

    let report = assistant(theft_index().without_stats()).health().await;
    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert!(report.error.is_some());
}

#[tokio::test]
async fn test_embedding_runs_off_the_runtime_thread() {
    let embedder = Arc::new(ThreadRecordingEmbedder::default());
    let mitra = assistant_with(embedder.clone(), theft_index());

    mitra
        .ask(AskRequest::new("What is theft under the IPC?"))
        .await
        .unwrap();

    let embed_thread = embedder.thread.lock().unwrap().expect("embed was called");
    assert_ne!(embed_thread, thread::current().id());
}

#[tokio::test]
async fn test_embedding_crash_is_an_error() {
    let mitra = assistant_with(Arc::new(CrashingEmbedder), theft_index());

    let err = mitra
        .ask(AskRequest::new("What is theft under the IPC?"))
        .await
        .unwrap_err();

    assert!(matches!(err, MitraError::Other(_)));
    assert!(mitra.retrieval().index().queried().is_empty());
}

#[test]
fn test_unhealthy_report_for_setup_failure() {
    let config = Config::default();
    let err = MitraError::MissingCredential {
        env: "PINECONE_API_KEY".to_string(),
    };

    let report = HealthReport::unhealthy(
        config.embedding.model.as_str(),
        config.llm.model.as_str(),
        &err,
    );

    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert_eq!(report.embedding_model, "bge-base-en-v1.5");
    assert_eq!(report.llm_model, "gemini-1.5-flash");
    assert!(report.total_vectors.is_none());
    assert!(report.error.unwrap().contains("PINECONE_API_KEY"));

    let json = serde_json::to_value(HealthReport::unhealthy("e", "l", "down")).unwrap();
    assert_eq!(json["status"], "unhealthy");
    assert!(json.get("total_vectors").is_none());
}
