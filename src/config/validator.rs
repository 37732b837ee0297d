use crate::config::{Config, SCHEMA_VERSION};
use crate::error::{MitraError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_index(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_llm(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);
        Self::validate_query(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(MitraError::ConfigValidation { errors })
        }
    }

    /// Check that the API keys named by the configuration are present.
    ///
    /// Kept apart from [`ConfigValidator::validate`] so that offline commands
    /// (`config show`, `config validate`) work without credentials.
    pub fn validate_credentials(config: &Config) -> Result<()> {
        for env_var in [&config.index.api_key_env, &config.llm.api_key_env] {
            match std::env::var(env_var) {
                Ok(key) if !key.is_empty() => {}
                _ => {
                    return Err(MitraError::MissingCredential {
                        env: env_var.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != SCHEMA_VERSION {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_index(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.index.name.is_empty() {
            errors.push(ValidationError::new(
                "index.name",
                "Index name cannot be empty",
            ));
        }

        if config.index.api_key_env.is_empty() {
            errors.push(ValidationError::new(
                "index.api_key_env",
                "API key environment variable name cannot be empty",
            ));
        }

        if config.index.timeout_secs == 0 {
            errors.push(ValidationError::new(
                "index.timeout_secs",
                "Timeout must be greater than 0",
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }

        if config.embedding.dimension == 0 {
            errors.push(ValidationError::new(
                "embedding.dimension",
                "Dimension must be greater than 0",
            ));
        }
    }

    fn validate_llm(config: &Config, errors: &mut Vec<ValidationError>) {
        let temp = config.llm.temperature;
        if !(0.0..=2.0).contains(&temp) {
            errors.push(ValidationError::new(
                "llm.temperature",
                format!("Temperature must be between 0.0 and 2.0, got {}", temp),
            ));
        }

        let provider = &config.llm.provider;
        let valid_providers = ["gemini"];
        if !valid_providers.contains(&provider.as_str()) {
            errors.push(ValidationError::new(
                "llm.provider",
                format!(
                    "Provider must be one of {:?}, got '{}'",
                    valid_providers, provider
                ),
            ));
        }

        if config.llm.model.is_empty() {
            errors.push(ValidationError::new("llm.model", "Model cannot be empty"));
        }

        if config.llm.max_tokens == 0 {
            errors.push(ValidationError::new(
                "llm.max_tokens",
                "Max tokens must be greater than 0",
            ));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        let retrieval = &config.retrieval;

        if retrieval.top_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.top_k",
                "top_k must be greater than 0",
            ));
        }

        if retrieval.top_k > retrieval.max_top_k {
            errors.push(ValidationError::new(
                "retrieval.top_k",
                format!(
                    "top_k ({}) cannot exceed max_top_k ({})",
                    retrieval.top_k, retrieval.max_top_k
                ),
            ));
        }

        if !(0.0..=1.0).contains(&retrieval.score_threshold) {
            errors.push(ValidationError::new(
                "retrieval.score_threshold",
                format!(
                    "Score threshold must be between 0.0 and 1.0, got {}",
                    retrieval.score_threshold
                ),
            ));
        }

        if !retrieval.section_boost.is_finite() || retrieval.section_boost < 1.0 {
            errors.push(ValidationError::new(
                "retrieval.section_boost",
                format!(
                    "Section boost must be at least 1.0, got {}",
                    retrieval.section_boost
                ),
            ));
        }

        if retrieval.overfetch_factor == 0 {
            errors.push(ValidationError::new(
                "retrieval.overfetch_factor",
                "Overfetch factor must be greater than 0",
            ));
        }

        if retrieval.partition_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "retrieval.partition_timeout_secs",
                "Partition timeout must be greater than 0",
            ));
        }

        if retrieval.fallback_partitions.is_empty() {
            errors.push(ValidationError::new(
                "retrieval.fallback_partitions",
                "At least one fallback partition is required",
            ));
        }
    }

    fn validate_query(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.query.min_question_chars > config.query.max_question_chars {
            errors.push(ValidationError::new(
                "query.min_question_chars",
                "Minimum question length cannot exceed the maximum",
            ));
        }
    }
}
