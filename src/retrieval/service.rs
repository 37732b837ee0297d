//! Partition selection, fan-out and ranking over one vector index

use crate::config::RetrievalConfig;
use crate::index::{IndexError, IndexStats, VectorIndex};
use crate::intent::{QueryIntent, QueryIntentAnalyzer};
use crate::retrieval::fanout::{apply_section_boost, fan_out};
use crate::retrieval::{rank, Hit, RetrievalError, RetrievalRequest};
use std::time::Duration;

/// Settings the retrieval core reads from configuration
#[derive(Debug, Clone)]
pub struct RetrievalSettings {
    pub overfetch_factor: usize,
    pub section_boost: f32,
    pub partition_timeout: Duration,
    pub fallback_partitions: Vec<String>,
}

impl From<&RetrievalConfig> for RetrievalSettings {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            overfetch_factor: config.overfetch_factor,
            section_boost: config.section_boost,
            partition_timeout: Duration::from_secs(config.partition_timeout_secs),
            fallback_partitions: config.fallback_partitions.clone(),
        }
    }
}

/// Which rule chose the partitions for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionSource {
    Explicit,
    Detected,
    Discovered,
    Fallback,
}

/// Retrieval core over an injected vector index
pub struct RetrievalService<I> {
    index: I,
    analyzer: QueryIntentAnalyzer,
    settings: RetrievalSettings,
}

impl<I: VectorIndex> RetrievalService<I> {
    pub fn new(index: I, analyzer: QueryIntentAnalyzer, settings: RetrievalSettings) -> Self {
        Self {
            index,
            analyzer,
            settings,
        }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn analyzer(&self) -> &QueryIntentAnalyzer {
        &self.analyzer
    }

    /// Retrieve the ranked, bounded hit list for a question.
    ///
    /// Only invalid requests are errors; partial or total partition failure
    /// and "nothing above threshold" all yield `Ok`, possibly empty.
    pub async fn retrieve(
        &self,
        query_vector: &[f32],
        request: &RetrievalRequest,
    ) -> Result<Vec<Hit>, RetrievalError> {
        request.validate()?;

        let intent = self.analyzer.analyze(&request.query_text);
        if let Some(section) = &intent.target_section {
            tracing::info!("Target section detected: {}", section);
        }

        let (partitions, source) = self.select_partitions(request, &intent).await;
        if partitions.is_empty() {
            tracing::warn!("No partitions available");
            return Ok(Vec::new());
        }
        tracing::info!("Searching partitions ({:?}): {:?}", source, partitions);

        let limit = request.top_k.saturating_mul(self.settings.overfetch_factor);
        let hits = fan_out(
            &self.index,
            query_vector,
            &partitions,
            limit,
            request.score_threshold,
            self.settings.partition_timeout,
        )
        .await;

        let hits = match &intent.target_section {
            Some(target) => apply_section_boost(hits, target, self.settings.section_boost),
            None => hits,
        };

        let ranked = rank(&hits, request.top_k, intent.target_section.as_deref());
        tracing::info!("Returning {} of {} hits", ranked.len(), hits.len());
        Ok(ranked)
    }

    /// Partitions to search: explicit, else detected, else discovered
    pub async fn select_partitions(
        &self,
        request: &RetrievalRequest,
        intent: &QueryIntent,
    ) -> (Vec<String>, PartitionSource) {
        if let Some(explicit) = request.partitions.as_ref().filter(|p| !p.is_empty()) {
            let mut unique: Vec<String> = Vec::with_capacity(explicit.len());
            for partition in explicit {
                if !unique.contains(partition) {
                    unique.push(partition.clone());
                }
            }
            return (unique, PartitionSource::Explicit);
        }

        if !intent.mentioned_acts.is_empty() {
            tracing::info!("Acts mentioned in question: {:?}", intent.mentioned_acts);
            return (
                intent.mentioned_acts.iter().cloned().collect(),
                PartitionSource::Detected,
            );
        }

        self.discover_partitions().await
    }

    /// All partitions known to the index, with the fixed list as fallback
    pub async fn available_partitions(&self) -> Vec<String> {
        self.discover_partitions().await.0
    }

    async fn discover_partitions(&self) -> (Vec<String>, PartitionSource) {
        match self.index.list_partitions().await {
            Ok(partitions) => {
                tracing::info!("Available partitions: {:?}", partitions);
                (partitions, PartitionSource::Discovered)
            }
            Err(e) => {
                tracing::warn!("Partition discovery failed, using fallback list: {}", e);
                (
                    self.settings.fallback_partitions.clone(),
                    PartitionSource::Fallback,
                )
            }
        }
    }

    pub async fn index_stats(&self) -> Result<IndexStats, IndexError> {
        self.index.describe_stats().await
    }
}
