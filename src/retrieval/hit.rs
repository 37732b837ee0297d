//! Scored hits with partition provenance

use crate::index::{HitMetadata, RawMatch};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A candidate section with relevance score and provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Vector id in the index
    pub id: String,

    /// Similarity score; exceeds 1.0 only after a target-section boost
    pub score: f32,

    /// Partition (index namespace) the hit came from
    #[serde(rename = "namespace")]
    pub partition: String,

    /// Section metadata
    pub metadata: HitMetadata,

    /// Set when the section number equals the question's target section
    pub is_target_section: bool,
}

impl Hit {
    /// Tag a raw match with the partition it came from
    pub fn from_match(raw: RawMatch, partition: &str) -> Self {
        Self {
            id: raw.id,
            score: raw.score,
            partition: partition.to_string(),
            metadata: raw.metadata,
            is_target_section: false,
        }
    }

    /// (act name, section number) identity of this hit
    pub fn section_key(&self) -> (&str, &str) {
        self.metadata.section_key()
    }

    pub fn section_number(&self) -> &str {
        &self.metadata.section_number
    }

    /// Flag and boost the hit if its section equals `target`.
    ///
    /// Returns false, leaving the hit untouched, when the section differs or
    /// the hit is already flagged, so a hit is boosted at most once.
    pub fn boost_if_target(&mut self, target: &str, factor: f32) -> bool {
        if self.is_target_section || self.metadata.section_number != target {
            return false;
        }
        self.is_target_section = true;
        self.score *= factor;
        true
    }
}

/// Score-descending order; NaN-safe
pub(crate) fn by_score_desc(a: &Hit, b: &Hit) -> Ordering {
    b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(section: &str, score: f32) -> Hit {
        Hit::from_match(
            RawMatch {
                id: format!("ipc-{}", section),
                score,
                metadata: HitMetadata {
                    act_name: "Indian Penal Code".to_string(),
                    section_number: section.to_string(),
                    ..Default::default()
                },
            },
            "ipc",
        )
    }

    #[test]
    fn test_from_match_tags_partition() {
        let h = hit("302", 0.8);
        assert_eq!(h.partition, "ipc");
        assert!(!h.is_target_section);
    }

    #[test]
    fn test_boost_applied_once() {
        let mut h = hit("302", 0.8);
        assert!(h.boost_if_target("302", 1.2));
        let boosted = h.score;
        assert!((boosted - 0.96).abs() < 1e-6);

        assert!(!h.boost_if_target("302", 1.2));
        assert_eq!(h.score, boosted);
    }

    #[test]
    fn test_boost_requires_exact_section() {
        let mut h = hit("302A", 0.8);
        assert!(!h.boost_if_target("302", 1.2));
        assert_eq!(h.score, 0.8);
        assert!(!h.is_target_section);
    }

    #[test]
    fn test_serializes_partition_as_namespace() {
        let json = serde_json::to_value(hit("302", 0.8)).unwrap();
        assert_eq!(json["namespace"], "ipc");
        assert_eq!(json["metadata"]["section_number"], "302");
    }
}
