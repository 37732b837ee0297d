//! Question answering pipeline: embed, retrieve, generate
//!
//! [`LegalAssistant`] owns the injected collaborators and applies the request
//! rules that sit in front of the retrieval core (question length, `top_k`
//! defaulting, the "nothing found" answer).

use crate::config::{QueryConfig, RetrievalConfig};
use crate::embedding::EmbeddingProvider;
use crate::error::{MitraError, Result};
use crate::index::{NamespaceStats, VectorIndex};
use crate::llm::{non_empty_or, AnswerGenerator};
use crate::retrieval::{Hit, RetrievalRequest, RetrievalService};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Answer given when no section clears the score threshold
pub const NO_RESULTS_ANSWER: &str = "I couldn't find relevant information in the legal documents to answer your question. Please try rephrasing or asking about a different topic.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub namespaces: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub include_sources: bool,
}

fn default_true() -> bool {
    true
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: None,
            namespaces: None,
            include_sources: true,
        }
    }
}

/// One cited section in an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub act_name: String,
    pub section_number: String,
    pub text_preview: String,
    pub score: f32,
    pub namespace: String,
}

impl From<&Hit> for Source {
    fn from(hit: &Hit) -> Self {
        Self {
            act_name: non_empty_or(&hit.metadata.act_name, "Unknown").to_string(),
            section_number: non_empty_or(&hit.metadata.section_number, "N/A").to_string(),
            text_preview: hit.metadata.text_preview.clone(),
            score: hit.score,
            namespace: hit.partition.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskMetadata {
    pub retrieved_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub sources: Vec<Source>,
    pub metadata: AskMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveRequest {
    pub question: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub namespaces: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub question: String,
    pub retrieved_count: usize,
    pub documents: Vec<Hit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespacesReport {
    pub total_namespaces: usize,
    pub namespaces: Vec<String>,
    pub details: BTreeMap<String, NamespaceStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub embedding_model: String,
    pub llm_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_vectors: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    /// Report for a service that could not be reached or set up
    pub fn unhealthy(
        embedding_model: impl Into<String>,
        llm_model: impl Into<String>,
        error: impl std::fmt::Display,
    ) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            embedding_model: embedding_model.into(),
            llm_model: llm_model.into(),
            total_vectors: None,
            error: Some(error.to_string()),
        }
    }
}

/// The legal question-answering pipeline
pub struct LegalAssistant<I, G> {
    embedder: Arc<dyn EmbeddingProvider>,
    retrieval: RetrievalService<I>,
    generator: G,
    retrieval_config: RetrievalConfig,
    query_config: QueryConfig,
}

impl<I: VectorIndex, G: AnswerGenerator> LegalAssistant<I, G> {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        retrieval: RetrievalService<I>,
        generator: G,
        retrieval_config: RetrievalConfig,
        query_config: QueryConfig,
    ) -> Self {
        Self {
            embedder,
            retrieval,
            generator,
            retrieval_config,
            query_config,
        }
    }

    pub fn retrieval(&self) -> &RetrievalService<I> {
        &self.retrieval
    }

    /// Answer a question with cited sources
    pub async fn ask(&self, request: AskRequest) -> Result<AskResponse> {
        let question = self.validate_question(&request.question)?;
        let top_k = self.resolve_top_k(request.top_k);

        tracing::info!("Query: {}", question);
        let documents = self
            .retrieve_documents(&question, top_k, request.namespaces)
            .await?;
        tracing::info!("Retrieved {} documents", documents.len());

        if documents.is_empty() {
            return Ok(AskResponse {
                question,
                answer: NO_RESULTS_ANSWER.to_string(),
                sources: Vec::new(),
                metadata: AskMetadata {
                    retrieved_count: 0,
                    model_used: None,
                },
            });
        }

        tracing::info!("Generating answer...");
        let answer = self.generator.generate_answer(&question, &documents).await;

        let sources = if request.include_sources {
            documents.iter().map(Source::from).collect()
        } else {
            Vec::new()
        };

        Ok(AskResponse {
            question,
            answer,
            sources,
            metadata: AskMetadata {
                retrieved_count: documents.len(),
                model_used: Some(self.generator.model_name().to_string()),
            },
        })
    }

    /// Ranked documents for a question, without answer generation
    pub async fn retrieve_only(&self, request: RetrieveRequest) -> Result<RetrieveResponse> {
        let question = request.question.trim().to_string();
        if question.is_empty() {
            return Err(MitraError::InvalidQuestion(
                "Question cannot be empty".to_string(),
            ));
        }
        let top_k = self.resolve_top_k(request.top_k);

        let documents = self
            .retrieve_documents(&question, top_k, request.namespaces)
            .await?;

        Ok(RetrieveResponse {
            question,
            retrieved_count: documents.len(),
            documents,
        })
    }

    /// Searchable partitions and their vector counts
    pub async fn namespaces(&self) -> NamespacesReport {
        let namespaces = self.retrieval.available_partitions().await;
        let details = match self.retrieval.index_stats().await {
            Ok(stats) => stats.namespaces,
            Err(e) => {
                tracing::warn!("Error getting index stats: {}", e);
                BTreeMap::new()
            }
        };

        NamespacesReport {
            total_namespaces: namespaces.len(),
            namespaces,
            details,
        }
    }

    pub async fn health(&self) -> HealthReport {
        let embedding_model = self.embedder.model_name().to_string();
        let llm_model = self.generator.model_name().to_string();

        match self.retrieval.index_stats().await {
            Ok(stats) => HealthReport {
                status: HealthStatus::Healthy,
                embedding_model,
                llm_model,
                total_vectors: Some(stats.total_vector_count),
                error: None,
            },
            Err(e) => HealthReport::unhealthy(embedding_model, llm_model, e),
        }
    }

    async fn retrieve_documents(
        &self,
        question: &str,
        top_k: usize,
        namespaces: Option<Vec<String>>,
    ) -> Result<Vec<Hit>> {
        // local model inference is CPU bound
        let embedder = Arc::clone(&self.embedder);
        let text = question.to_string();
        let embedded = tokio::task::spawn_blocking(move || embedder.embed(&text))
            .await
            .map_err(|e| anyhow::Error::new(e).context("Embedding task failed"))?;
        let query_vector = embedded?;

        let mut request =
            RetrievalRequest::new(question, top_k, self.retrieval_config.score_threshold);
        if let Some(namespaces) = namespaces {
            request = request.with_partitions(namespaces);
        }

        Ok(self.retrieval.retrieve(&query_vector, &request).await?)
    }

    fn validate_question(&self, raw: &str) -> Result<String> {
        let question = raw.trim();
        let len = question.chars().count();

        if len < self.query_config.min_question_chars {
            return Err(MitraError::InvalidQuestion(format!(
                "Question must be at least {} characters long",
                self.query_config.min_question_chars
            )));
        }
        if len > self.query_config.max_question_chars {
            return Err(MitraError::InvalidQuestion(format!(
                "Question must be less than {} characters",
                self.query_config.max_question_chars
            )));
        }
        Ok(question.to_string())
    }

    /// Requested `top_k` if within `1..=max_top_k`, else the default
    fn resolve_top_k(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(k) if (1..=self.retrieval_config.max_top_k).contains(&k) => k,
            Some(k) => {
                tracing::debug!(
                    "top_k {} out of range, using default {}",
                    k,
                    self.retrieval_config.top_k
                );
                self.retrieval_config.top_k
            }
            None => self.retrieval_config.top_k,
        }
    }
}
