//! Pipeline configuration
//!
//! Loaded from TOML; every table and key is optional and falls back to the
//! defaults below.
//!
//! ```toml
//! pass_count = 8
//! collaborator_timeout_secs = 120
//! review_handling = "accept"
//!
//! [retry]
//! max_attempts = 3
//! initial_backoff_ms = 500
//! max_backoff_ms = 8000
//! multiplier = 2.0
//!
//! [review]
//! auto_accept_net_threshold = 2
//!
//! [logging]
//! level = "info"
//! json = false
//!
//! [validator]
//! auto_fix = true
//! ```

use crate::error::ConfigError;
use folio_snapshot::ReviewPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of sequential passes per job
    pub pass_count: u32,
    /// Deadline for a single collaborator call
    pub collaborator_timeout_secs: u64,
    pub retry: RetryConfig,
    pub review: ReviewPolicy,
    /// What to do with a pass whose recommendation is `review`
    pub review_handling: ReviewHandling,
    pub logging: LoggingConfig,
    pub validator: ValidatorConfig,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With pass count
    #[inline]
    #[must_use]
    pub fn with_pass_count(mut self, pass_count: u32) -> Self {
        self.pass_count = pass_count;
        self
    }

    /// With retry settings
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// With review policy
    #[inline]
    #[must_use]
    pub fn with_review(mut self, review: ReviewPolicy, handling: ReviewHandling) -> Self {
        self.review = review;
        self.review_handling = handling;
        self
    }

    /// With collaborator timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.collaborator_timeout_secs = secs;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// - [`ConfigError::Parse`] for malformed TOML
    /// - [`ConfigError::Invalid`] for out-of-range values
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// - [`ConfigError::Io`] if the file cannot be read
    /// - see [`PipelineConfig::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), passes = config.pass_count, "loaded pipeline config");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pass_count == 0 {
            return Err(ConfigError::invalid("pass_count", "must be at least 1"));
        }
        if self.collaborator_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "collaborator_timeout_secs",
                "must be at least 1",
            ));
        }
        self.retry.validate()
    }

    /// Deadline for one collaborator call
    #[inline]
    #[must_use]
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pass_count: 8,
            collaborator_timeout_secs: 120,
            retry: RetryConfig::default(),
            review: ReviewPolicy::conservative(),
            review_handling: ReviewHandling::default(),
            logging: LoggingConfig::default(),
            validator: ValidatorConfig::default(),
        }
    }
}

/// Retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
}

impl RetryConfig {
    /// No retries and no delay
    #[inline]
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            multiplier: 1.0,
        }
    }

    /// Delay before retry number `retry` (1-based), capped at `max_backoff_ms`
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let raw = self.initial_backoff_ms as f64 * self.multiplier.powi(exponent);
        let capped = raw.min(self.max_backoff_ms as f64).max(0.0);
        Duration::from_millis(capped as u64)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.multiplier.is_nan() || self.multiplier < 1.0 {
            return Err(ConfigError::invalid(
                "retry.multiplier",
                format!("must be >= 1.0, got {}", self.multiplier),
            ));
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err(ConfigError::invalid(
                "retry.max_backoff_ms",
                "must not be below initial_backoff_ms",
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8000,
            multiplier: 2.0,
        }
    }
}

/// Handling of passes recommended for review
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewHandling {
    /// Keep the pass output and flag it in the history
    #[default]
    Accept,
    /// Treat review like revert
    Revert,
    /// Stop the job before applying the pass
    Halt,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Pre-publish validation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Remove duplicates and normalize the H1 before export
    pub auto_fix: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { auto_fix: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_is_default() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.pass_count, 8);
        assert_eq!(config.review.auto_accept_net_threshold, None);
        assert_eq!(config.review_handling, ReviewHandling::Accept);
        assert!(config.validator.auto_fix);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            review_handling = "halt"

            [retry]
            max_attempts = 5

            [review]
            auto_accept_net_threshold = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff_ms, 500);
        assert_eq!(config.review, ReviewPolicy::auto_accept_at(2));
        assert_eq!(config.review_handling, ReviewHandling::Halt);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = PipelineConfig::from_toml_str("pass_count = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pass_count", .. }));

        let err = PipelineConfig::from_toml_str("[retry]\nmax_attempts = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "retry.max_attempts", .. }));

        let err = PipelineConfig::from_toml_str("[retry]\nmultiplier = 0.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "retry.multiplier", .. }));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = PipelineConfig::from_toml_str("pass_count = \"eight\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn backoff_grows_and_caps() {
        let retry = RetryConfig::default();
        assert_eq!(retry.backoff(1), Duration::from_millis(500));
        assert_eq!(retry.backoff(2), Duration::from_millis(1000));
        assert_eq!(retry.backoff(4), Duration::from_millis(4000));
        assert_eq!(retry.backoff(6), Duration::from_millis(8000));
        assert_eq!(RetryConfig::none().backoff(3), Duration::ZERO);
    }
}
