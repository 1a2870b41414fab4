//! Error types for the pass pipeline
//!
//! Covers:
//! - Collaborator failures (generation, rule evaluation, persistence)
//! - Timeouts and cancellation at pass boundaries
//! - Invalid configuration
//!
//! Regression outcomes are not errors. A `revert` or `review` recommendation
//! is recorded in the job history and the run continues.

use folio_fields::FieldsError;
use folio_snapshot::{JobId, SnapshotError};
use std::path::PathBuf;

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Content generator failed
    #[error("generation failed at pass {pass}: {source}")]
    Generation {
        pass: u32,
        #[source]
        source: anyhow::Error,
    },

    /// Rule evaluator failed
    #[error("rule evaluation failed at pass {pass}: {source}")]
    Evaluation {
        pass: u32,
        #[source]
        source: anyhow::Error,
    },

    /// Checkpoint store failed
    #[error("checkpoint store error: {0}")]
    Store(#[source] anyhow::Error),

    /// Collaborator call exceeded its deadline
    #[error("{operation} timed out after {duration_secs}s")]
    Timeout {
        operation: &'static str,
        duration_secs: u64,
    },

    /// Job was cancelled at a pass boundary
    #[error("job {job_id} cancelled after pass {last_completed_pass}")]
    Cancelled {
        job_id: JobId,
        last_completed_pass: u32,
    },

    /// Snapshots could not be compared or recorded
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Progressive fields could not be collected
    #[error("fields error: {0}")]
    Fields(#[from] FieldsError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Generation { .. } | Self::Evaluation { .. } | Self::Timeout { .. }
        )
    }

    /// Generation failure at `pass`
    #[inline]
    pub fn generation(pass: u32, source: impl Into<anyhow::Error>) -> Self {
        Self::Generation {
            pass,
            source: source.into(),
        }
    }

    /// Evaluation failure at `pass`
    #[inline]
    pub fn evaluation(pass: u32, source: impl Into<anyhow::Error>) -> Self {
        Self::Evaluation {
            pass,
            source: source.into(),
        }
    }

    /// Checkpoint store failure
    #[inline]
    pub fn store(source: impl Into<anyhow::Error>) -> Self {
        Self::Store(source.into())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Value out of its allowed range
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// Malformed TOML
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Invalid value for `field`
    #[inline]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_error_display() {
        let err = PipelineError::generation(3, anyhow::anyhow!("upstream 503"));
        assert_eq!(err.to_string(), "generation failed at pass 3: upstream 503");

        let err = PipelineError::Cancelled {
            job_id: JobId::new("job-1"),
            last_completed_pass: 4,
        };
        assert_eq!(err.to_string(), "job job-1 cancelled after pass 4");
    }

    #[test]
    fn pipeline_error_is_retryable() {
        assert!(PipelineError::generation(1, anyhow::anyhow!("x")).is_retryable());
        assert!(PipelineError::evaluation(1, anyhow::anyhow!("x")).is_retryable());
        assert!(PipelineError::Timeout {
            operation: "generate",
            duration_secs: 120
        }
        .is_retryable());
        assert!(!PipelineError::store(anyhow::anyhow!("disk full")).is_retryable());
        assert!(!PipelineError::from(SnapshotError::InvalidPassNumber(0)).is_retryable());
        assert!(!PipelineError::from(ConfigError::invalid("pass_count", "must be > 0")).is_retryable());
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::invalid("retry.multiplier", "must be >= 1.0");
        assert_eq!(err.to_string(), "invalid retry.multiplier: must be >= 1.0");
    }
}
