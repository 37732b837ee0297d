//! Partition-aware retrieval and ranking
//!
//! A question is analyzed for a target section and named acts, the chosen
//! partitions are queried, hits under the score threshold are dropped, exact
//! section matches are boosted, and the merged set is ranked down to `top_k`.

mod fanout;
mod hit;
mod ranker;
mod service;

pub use fanout::{apply_section_boost, fan_out};
pub use hit::Hit;
pub use ranker::{rank, rank_diverse, rank_exact_section};
pub use service::{PartitionSource, RetrievalService, RetrievalSettings};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// One retrieval request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalRequest {
    /// Question text, used for intent analysis
    pub query_text: String,

    /// Maximum number of results
    pub top_k: usize,

    /// Explicit partitions; `None` or empty lets the question decide
    pub partitions: Option<Vec<String>>,

    /// Minimum raw similarity score
    pub score_threshold: f32,
}

impl RetrievalRequest {
    pub fn new(query_text: impl Into<String>, top_k: usize, score_threshold: f32) -> Self {
        Self {
            query_text: query_text.into(),
            top_k,
            partitions: None,
            score_threshold,
        }
    }

    pub fn with_partitions(mut self, partitions: Vec<String>) -> Self {
        self.partitions = Some(partitions);
        self
    }

    /// Reject inputs no caller should send
    pub fn validate(&self) -> Result<(), RetrievalError> {
        if self.top_k == 0 {
            return Err(RetrievalError::InvalidRequest(
                "top_k must be at least 1".to_string(),
            ));
        }
        if !self.score_threshold.is_finite() {
            return Err(RetrievalError::InvalidRequest(
                "score threshold must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}
