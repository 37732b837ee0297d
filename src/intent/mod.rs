//! Query intent analysis
//!
//! Extracts an explicit section/article reference and the acts a question
//! mentions. Absence of either is a normal outcome, never an error.

use crate::patterns::PatternRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Structured signal extracted from a question
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIntent {
    /// Upper-cased section number, e.g. "302" or "376A"
    pub target_section: Option<String>,
    /// Partitions of the acts named in the question
    pub mentioned_acts: BTreeSet<String>,
}

/// Regex-table driven intent analyzer
#[derive(Debug, Clone)]
pub struct QueryIntentAnalyzer {
    patterns: Arc<PatternRegistry>,
}

impl QueryIntentAnalyzer {
    pub fn new(patterns: Arc<PatternRegistry>) -> Self {
        Self { patterns }
    }

    /// Analyze a question in one pass over the lower-cased text
    pub fn analyze(&self, query: &str) -> QueryIntent {
        let lowered = query.to_lowercase();
        QueryIntent {
            target_section: self.target_section_in(&lowered),
            mentioned_acts: self.acts_in(&lowered),
        }
    }

    /// First section reference in the question.
    ///
    /// Patterns are tried in table order; within a pattern the leftmost
    /// occurrence wins.
    pub fn extract_target_section(&self, query: &str) -> Option<String> {
        self.target_section_in(&query.to_lowercase())
    }

    /// Partitions of every act the question mentions
    pub fn detect_mentioned_acts(&self, query: &str) -> BTreeSet<String> {
        self.acts_in(&query.to_lowercase())
    }

    fn target_section_in(&self, lowered: &str) -> Option<String> {
        self.patterns.sections.iter().find_map(|pattern| {
            pattern
                .regex
                .captures(lowered)
                .and_then(|caps| caps.get(1))
                .map(|m| {
                    tracing::debug!("Section reference '{}' via {}", m.as_str(), pattern.name);
                    m.as_str().to_uppercase()
                })
        })
    }

    fn acts_in(&self, lowered: &str) -> BTreeSet<String> {
        self.patterns
            .acts
            .iter()
            .filter(|act| act.is_mentioned(lowered))
            .map(|act| act.partition.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> QueryIntentAnalyzer {
        QueryIntentAnalyzer::new(Arc::new(PatternRegistry::builtin().unwrap()))
    }

    #[test]
    fn test_section_keyword() {
        let a = analyzer();
        assert_eq!(
            a.extract_target_section("What does Section 302 say?"),
            Some("302".to_string())
        );
        assert_eq!(
            a.extract_target_section("explain sec. 376a"),
            Some("376A".to_string())
        );
        assert_eq!(
            a.extract_target_section("Article 21 and the right to life"),
            Some("21".to_string())
        );
    }

    #[test]
    fn test_number_before_and_after_act() {
        let a = analyzer();
        assert_eq!(
            a.extract_target_section("punishment for 420 IPC"),
            Some("420".to_string())
        );
        assert_eq!(
            a.extract_target_section("is bns 103 bailable"),
            Some("103".to_string())
        );
    }

    #[test]
    fn test_pattern_priority_over_position() {
        // "ipc 420" appears first, but the keyword pattern has priority
        let a = analyzer();
        assert_eq!(
            a.extract_target_section("ipc 420 versus section 406"),
            Some("406".to_string())
        );
    }

    #[test]
    fn test_first_occurrence_within_pattern() {
        let a = analyzer();
        assert_eq!(
            a.extract_target_section("compare section 378 with section 379"),
            Some("378".to_string())
        );
    }

    #[test]
    fn test_no_section() {
        let a = analyzer();
        assert_eq!(a.extract_target_section("How do I file an FIR?"), None);
    }

    #[test]
    fn test_single_act() {
        let a = analyzer();
        let acts = a.detect_mentioned_acts("What is the punishment under IPC for theft?");
        assert_eq!(acts.into_iter().collect::<Vec<_>>(), vec!["ipc".to_string()]);
    }

    #[test]
    fn test_multiple_acts() {
        let a = analyzer();
        let acts =
            a.detect_mentioned_acts("Is a confession admissible under the Evidence Act and CrPC?");
        assert!(acts.contains("iea"));
        assert!(acts.contains("crpc"));
        assert_eq!(acts.len(), 2);
    }

    #[test]
    fn test_abbreviation_needs_word_boundary() {
        let a = analyzer();
        assert!(a.detect_mentioned_acts("a practical question about rent").is_empty());
    }

    #[test]
    fn test_section_without_act() {
        let intent = analyzer().analyze("Explain Section 302");
        assert_eq!(intent.target_section.as_deref(), Some("302"));
        assert!(intent.mentioned_acts.is_empty());
    }
}
