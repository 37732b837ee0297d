//! Partitioned vector index collaborator
//!
//! The retrieval core only ever sees [`RawMatch`] and [`HitMetadata`]; every
//! provider-specific response shape is normalized here, at the boundary.

mod pinecone;

pub use pinecone::PineconeIndex;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Index service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("API key environment variable {env} is not set")]
    MissingApiKey { env: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Query on partition '{partition}' timed out after {secs}s")]
    Timeout { partition: String, secs: u64 },
}

/// Partitioned nearest-neighbour search service
pub trait VectorIndex: Send + Sync {
    /// Partitions currently present in the index
    fn list_partitions(&self) -> impl Future<Output = Result<Vec<String>, IndexError>> + Send;

    /// Top-`limit` matches for `vector` within one partition, best first
    fn query_partition(
        &self,
        vector: &[f32],
        limit: usize,
        partition: &str,
    ) -> impl Future<Output = Result<Vec<RawMatch>, IndexError>> + Send;

    /// Index-wide and per-partition vector counts
    fn describe_stats(&self) -> impl Future<Output = Result<IndexStats, IndexError>> + Send;
}

/// One match as returned by a partition query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMatch {
    pub id: String,
    pub score: f32,
    pub metadata: HitMetadata,
}

/// Metadata stored alongside each indexed section
///
/// Missing fields default to empty strings; display placeholders are applied
/// by the presentation layer, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitMetadata {
    #[serde(default)]
    pub act_name: String,
    #[serde(default)]
    pub section_number: String,
    #[serde(default)]
    pub act_code: String,
    #[serde(default)]
    pub text_preview: String,
    /// Any other stored fields, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HitMetadata {
    /// Normalize a loosely-typed metadata map.
    ///
    /// Numbers are accepted where strings are expected, since section numbers
    /// are sometimes stored numerically.
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let act_name = take_string(&mut map, &["act_name"]);
        let section_number = take_string(&mut map, &["section_number", "section"]);
        let act_code = take_string(&mut map, &["act_code", "act_short", "act"]);
        let text_preview = take_string(&mut map, &["text_preview", "text"]);

        Self {
            act_name,
            section_number,
            act_code,
            text_preview,
            extra: map,
        }
    }

    /// Key used to collapse near-identical chunks of one section
    pub fn section_key(&self) -> (&str, &str) {
        (self.act_name.as_str(), self.section_number.as_str())
    }
}

fn take_string(map: &mut Map<String, Value>, keys: &[&str]) -> String {
    for key in keys {
        let value = match map.get(*key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => continue,
        };
        map.remove(*key);
        return value;
    }
    String::new()
}

/// Per-partition statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceStats {
    pub vector_count: u64,
}

/// Index statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_vector_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
    pub namespaces: BTreeMap<String, NamespaceStats>,
}
