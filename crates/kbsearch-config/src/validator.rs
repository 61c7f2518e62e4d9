//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

const KNOWN_PROVIDERS: &[&str] = &["openai", "hashing"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_search(config, &mut result);
        Self::validate_embedding(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    /// Validate and turn the first error into a [`ConfigError::InvalidValue`].
    ///
    /// Returns the warnings when the configuration is usable.
    pub fn require_valid(config: &Config) -> Result<Vec<ValidationWarning>, ConfigError> {
        let result = Self::validate(config)?;
        match result.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(result.warnings),
        }
    }

    fn validate_search(config: &Config, result: &mut ValidationResult) {
        let search = &config.search;

        if search.max_match_count == 0 {
            result.add_error(ValidationError::new(
                "search.max_match_count",
                "max_match_count must be greater than 0",
            ));
        }

        if search.default_match_count == 0 || search.default_match_count > search.max_match_count
        {
            result.add_error(ValidationError::new(
                "search.default_match_count",
                format!(
                    "default_match_count must be between 1 and max_match_count ({})",
                    search.max_match_count
                ),
            ));
        }

        if search.num_candidates == 0 {
            result.add_error(ValidationError::new(
                "search.num_candidates",
                "num_candidates must be greater than 0",
            ));
        } else if search.num_candidates < search.max_match_count.saturating_mul(2) {
            result.add_warning(ValidationWarning::new(
                "search.num_candidates",
                "num_candidates is below twice max_match_count; large hybrid queries will \
                 widen the pool automatically",
            ));
        }
    }

    fn validate_embedding(config: &Config, result: &mut ValidationResult) {
        let embedding = &config.embedding;

        if !KNOWN_PROVIDERS.contains(&embedding.provider.as_str()) {
            result.add_error(ValidationError::new(
                "embedding.provider",
                format!(
                    "Unknown embedding provider '{}', expected one of: {}",
                    embedding.provider,
                    KNOWN_PROVIDERS.join(", ")
                ),
            ));
        }

        if embedding.dimension == 0 {
            result.add_error(ValidationError::new(
                "embedding.dimension",
                "dimension must be greater than 0",
            ));
        }

        if embedding.provider == "openai" {
            if embedding.api_key.is_empty() {
                result.add_warning(ValidationWarning::new(
                    "embedding.api_key",
                    "No API key configured; semantic search will degrade to empty results",
                ));
            }

            if embedding.base_url.is_empty() {
                result.add_error(ValidationError::new(
                    "embedding.base_url",
                    "base_url cannot be empty",
                ));
            }

            if embedding.timeout_seconds == 0 {
                result.add_error(ValidationError::new(
                    "embedding.timeout_seconds",
                    "timeout_seconds must be greater than 0",
                ));
            }
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "Log level cannot be empty",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
