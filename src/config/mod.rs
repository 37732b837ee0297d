//! Configuration management for the legal assistant
//!
//! Loads the TOML configuration file, applies environment overrides and named
//! profiles, and validates the result before anything is constructed from it.

use crate::error::{MitraError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Supported configuration schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Partitions searched when the index cannot report its namespaces
pub const FALLBACK_PARTITIONS: [&str; 8] = [
    "ipc",
    "bns",
    "crpc",
    "iea",
    "constitution",
    "hma",
    "cpa",
    "ica",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub query: QueryConfig,
    #[serde(default)]
    pub patterns: PatternsConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Vector index (Pinecone) connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub name: String,
    pub api_key_env: String,
    /// Data-plane host; resolved from the control plane when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub control_plane_url: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

/// Query embedding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

/// Hosted LLM settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub api_key_env: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

/// Retrieval and ranking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub max_top_k: usize,
    pub score_threshold: f32,
    pub section_boost: f32,
    pub overfetch_factor: usize,
    pub partition_timeout_secs: u64,
    pub fallback_partitions: Vec<String>,
}

/// Question acceptance bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub min_question_chars: usize,
    pub max_question_chars: usize,
}

/// Optional custom intent table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_file: Option<PathBuf>,
}

/// Profile-specific configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MitraError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| MitraError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| MitraError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Load configuration with a specific profile applied
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_profile(profile)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Apply a profile's overrides to the configuration
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        let overrides = self
            .profiles
            .get(profile)
            .cloned()
            .ok_or_else(|| MitraError::Config(format!("Unknown profile: {}", profile)))?;

        if let Some(top_k) = overrides.top_k {
            self.retrieval.top_k = top_k;
        }
        if let Some(threshold) = overrides.score_threshold {
            self.retrieval.score_threshold = threshold;
        }
        if let Some(model) = overrides.llm_model {
            self.llm.model = model;
        }
        if let Some(temperature) = overrides.temperature {
            self.llm.temperature = temperature;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: MITRA_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("MITRA_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "INDEX__NAME" => {
                self.index.name = value.to_string();
            }
            "INDEX__HOST" => {
                self.index.host = Some(value.to_string());
            }
            "EMBEDDING__MODEL" => {
                self.embedding.model = value.to_string();
            }
            "LLM__MODEL" => {
                self.llm.model = value.to_string();
            }
            "RETRIEVAL__TOP_K" => {
                self.retrieval.top_k = parse_env(path, value)?;
            }
            "RETRIEVAL__SCORE_THRESHOLD" => {
                self.retrieval.score_threshold = parse_env(path, value)?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| MitraError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("legal-mitra").join("config.toml"))
    }
}

fn parse_env<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| MitraError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}'", value),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: SCHEMA_VERSION.to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            index: IndexConfig {
                name: "legal-mitra".to_string(),
                api_key_env: "PINECONE_API_KEY".to_string(),
                host: None,
                control_plane_url: "https://api.pinecone.io".to_string(),
                api_version: "2024-07".to_string(),
                timeout_secs: 10,
            },
            embedding: EmbeddingConfig {
                model: "bge-base-en-v1.5".to_string(),
                dimension: 768,
            },
            llm: LlmConfig {
                provider: "gemini".to_string(),
                api_key_env: "GEMINI_API_KEY".to_string(),
                model: "gemini-1.5-flash".to_string(),
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                temperature: 0.3,
                max_tokens: 2048,
                timeout_secs: 60,
            },
            retrieval: RetrievalConfig {
                top_k: 7,
                max_top_k: 10,
                score_threshold: 0.5,
                section_boost: 1.2,
                overfetch_factor: 2,
                partition_timeout_secs: 10,
                fallback_partitions: FALLBACK_PARTITIONS.iter().map(|p| p.to_string()).collect(),
            },
            query: QueryConfig {
                min_question_chars: 5,
                max_question_chars: 500,
            },
            patterns: PatternsConfig::default(),
            profiles: HashMap::new(),
        }
    }
}
