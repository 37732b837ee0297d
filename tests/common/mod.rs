//! In-memory collaborators for pipeline tests
#![allow(dead_code)]

use legal_mitra::config::Config;
use legal_mitra::embedding::{EmbeddingError, EmbeddingProvider};
use legal_mitra::index::{
    HitMetadata, IndexError, IndexStats, NamespaceStats, RawMatch, VectorIndex,
};
use legal_mitra::intent::QueryIntentAnalyzer;
use legal_mitra::llm::AnswerGenerator;
use legal_mitra::patterns::PatternRegistry;
use legal_mitra::retrieval::{Hit, RetrievalService, RetrievalSettings};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn raw(id: &str, act: &str, section: &str, score: f32) -> RawMatch {
    RawMatch {
        id: id.to_string(),
        score,
        metadata: HitMetadata {
            act_name: act.to_string(),
            section_number: section.to_string(),
            act_code: String::new(),
            text_preview: format!("{} section {}", act, section),
            extra: Default::default(),
        },
    }
}

/// Canned per-partition matches with failure injection
#[derive(Default)]
pub struct FakeIndex {
    partitions: BTreeMap<String, Vec<RawMatch>>,
    failing: HashSet<String>,
    slow: HashSet<String>,
    list_fails: bool,
    stats_fail: bool,
    /// (partition, limit) per query, in call order
    queried: Mutex<Vec<(String, usize)>>,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partition(mut self, name: &str, matches: Vec<RawMatch>) -> Self {
        self.partitions.insert(name.to_string(), matches);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn slow(mut self, name: &str) -> Self {
        self.slow.insert(name.to_string());
        self
    }

    pub fn without_listing(mut self) -> Self {
        self.list_fails = true;
        self
    }

    pub fn without_stats(mut self) -> Self {
        self.stats_fail = true;
        self
    }

    /// Partitions queried so far, sorted
    pub fn queried(&self) -> Vec<String> {
        let mut queried: Vec<String> = self
            .queried
            .lock()
            .unwrap()
            .iter()
            .map(|(partition, _)| partition.clone())
            .collect();
        queried.sort();
        queried
    }

    /// Match limits requested so far, in call order
    pub fn limits(&self) -> Vec<usize> {
        self.queried
            .lock()
            .unwrap()
            .iter()
            .map(|(_, limit)| *limit)
            .collect()
    }
}

impl VectorIndex for FakeIndex {
    async fn list_partitions(&self) -> Result<Vec<String>, IndexError> {
        if self.list_fails {
            return Err(IndexError::InvalidResponse("listing unavailable".to_string()));
        }
        Ok(self.partitions.keys().cloned().collect())
    }

    async fn query_partition(
        &self,
        _vector: &[f32],
        limit: usize,
        partition: &str,
    ) -> Result<Vec<RawMatch>, IndexError> {
        self.queried
            .lock()
            .unwrap()
            .push((partition.to_string(), limit));

        if self.slow.contains(partition) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        if self.failing.contains(partition) {
            return Err(IndexError::Service {
                status: 503,
                body: format!("{} unavailable", partition),
            });
        }

        let mut matches = self.partitions.get(partition).cloned().unwrap_or_default();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        matches.truncate(limit);
        Ok(matches)
    }

    async fn describe_stats(&self) -> Result<IndexStats, IndexError> {
        if self.stats_fail {
            return Err(IndexError::Service {
                status: 500,
                body: "stats unavailable".to_string(),
            });
        }
        let namespaces: BTreeMap<String, NamespaceStats> = self
            .partitions
            .iter()
            .map(|(name, matches)| {
                (
                    name.clone(),
                    NamespaceStats {
                        vector_count: matches.len() as u64,
                    },
                )
            })
            .collect();
        Ok(IndexStats {
            total_vector_count: namespaces.values().map(|s| s.vector_count).sum(),
            dimension: Some(4),
            namespaces,
        })
    }
}

pub struct FakeEmbedder;

impl EmbeddingProvider for FakeEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("empty text".to_string()));
        }
        Ok(vec![0.5, 0.5, 0.5, 0.5])
    }

    fn dimension(&self) -> usize {
        4
    }

    fn model_name(&self) -> &str {
        "fake-embedder"
    }
}

/// Echoes the number of documents it was given
pub struct FakeGenerator;

impl AnswerGenerator for FakeGenerator {
    async fn generate_answer(&self, question: &str, documents: &[Hit]) -> String {
        format!("{} documents for: {}", documents.len(), question)
    }

    fn model_name(&self) -> &str {
        "fake-llm"
    }
}

pub fn settings() -> RetrievalSettings {
    let mut settings = RetrievalSettings::from(&Config::default().retrieval);
    settings.partition_timeout = Duration::from_millis(200);
    settings
}

pub fn service(index: FakeIndex) -> RetrievalService<FakeIndex> {
    let patterns = PatternRegistry::builtin().unwrap();
    RetrievalService::new(index, QueryIntentAnalyzer::new(Arc::new(patterns)), settings())
}

pub fn ids(hits: &[Hit]) -> Vec<&str> {
    hits.iter().map(|h| h.id.as_str()).collect()
}
