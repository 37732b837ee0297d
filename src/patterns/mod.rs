//! Pattern registry for query intent detection
//!
//! This module provides:
//! - Section-reference patterns, tried in priority order
//! - Act trigger patterns mapping a partition to the phrases that name its act
//!
//! Both tables are plain data loaded from TOML (`config-templates/intent.toml`
//! is compiled in as the default), so new acts can be added without touching
//! the analyzer.

use crate::error::{MitraError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Built-in intent table
const DEFAULT_INTENT_TABLE: &str = include_str!("../../config-templates/intent.toml");

/// Section-reference pattern configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionPatternConfig {
    pub name: String,
    /// Regex with exactly one capture group holding the section number
    pub pattern: String,
}

/// Act trigger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActTriggerConfig {
    /// Partition (index namespace) searched when the act is mentioned
    pub partition: String,
    #[serde(default)]
    pub name: String,
    pub triggers: Vec<String>,
}

/// Intent table file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentTableConfig {
    #[serde(default)]
    pub section: Vec<SectionPatternConfig>,
    #[serde(default)]
    pub act: Vec<ActTriggerConfig>,
}

/// Compiled section-reference pattern
#[derive(Debug, Clone)]
pub struct CompiledSectionPattern {
    pub name: String,
    pub regex: Regex,
}

/// Compiled act matcher
#[derive(Debug, Clone)]
pub struct CompiledActMatcher {
    pub partition: String,
    pub name: String,
    pub triggers: Vec<Regex>,
}

impl CompiledActMatcher {
    /// True if any trigger matches the (already lower-cased) text
    pub fn is_mentioned(&self, text: &str) -> bool {
        self.triggers.iter().any(|t| t.is_match(text))
    }
}

/// Pattern registry with all pre-compiled intent patterns
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    /// Section-reference patterns in priority order
    pub sections: Vec<CompiledSectionPattern>,
    /// Act matchers in table order
    pub acts: Vec<CompiledActMatcher>,
}

impl PatternRegistry {
    /// Registry compiled from the built-in intent table
    pub fn builtin() -> Result<Self> {
        let config: IntentTableConfig = toml::from_str(DEFAULT_INTENT_TABLE)?;
        Self::from_config(config)
    }

    /// Load pattern registry from an intent table file
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MitraError::Io {
            source: e,
            context: format!("Failed to read intent table: {:?}", path),
        })?;
        let config: IntentTableConfig = toml::from_str(&content)?;
        Self::from_config(config)
    }

    /// Build pattern registry from a parsed intent table
    pub fn from_config(config: IntentTableConfig) -> Result<Self> {
        let sections = config
            .section
            .iter()
            .map(|sp| {
                let regex = Regex::new(&sp.pattern).map_err(|e| {
                    MitraError::Config(format!(
                        "Invalid section pattern '{}': {}",
                        sp.name, e
                    ))
                })?;

                // captures_len counts the implicit whole-match group
                if regex.captures_len() < 2 {
                    return Err(MitraError::Config(format!(
                        "Section pattern '{}' needs a capture group for the section number",
                        sp.name
                    )));
                }

                Ok(CompiledSectionPattern {
                    name: sp.name.clone(),
                    regex,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut acts = Vec::new();
        let mut partitions = HashSet::new();

        for act_cfg in &config.act {
            if act_cfg.partition.is_empty() {
                return Err(MitraError::Config(format!(
                    "Act '{}' has an empty partition",
                    act_cfg.name
                )));
            }

            let triggers: Vec<Regex> = act_cfg
                .triggers
                .iter()
                .map(|p| {
                    Regex::new(p).map_err(|e| {
                        MitraError::Config(format!(
                            "Invalid trigger for act '{}': {}",
                            act_cfg.partition, e
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            if !partitions.insert(act_cfg.partition.as_str()) {
                return Err(MitraError::Config(format!(
                    "Duplicate act partition: {}",
                    act_cfg.partition
                )));
            }

            acts.push(CompiledActMatcher {
                partition: act_cfg.partition.clone(),
                name: act_cfg.name.clone(),
                triggers,
            });
        }

        Ok(Self { sections, acts })
    }
}
