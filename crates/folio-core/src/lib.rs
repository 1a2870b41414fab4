//! Folio Core - pass pipeline orchestration
//!
//! Runs a document-generation job through its fixed sequence of passes:
//! - Plans depth and template once per job
//! - Sends each pass a holistic summary instead of the full document
//! - Gates every pass on a before/after rule snapshot comparison
//! - Reverts rejected passes atomically
//! - Collects progressive structured-data fields from applied passes
//! - Checkpoints at pass boundaries for cancellation and resume
//! - Validates the final document before export
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_core::{InMemoryCheckpointStore, JobInput, PassPipeline, PipelineConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::load("folio.toml")?;
//! folio_core::init_tracing(&config.logging);
//!
//! let pipeline = PassPipeline::new(
//!     config,
//!     Arc::new(my_generator),
//!     Arc::new(my_evaluator),
//!     Arc::new(InMemoryCheckpointStore::new()),
//! )?;
//!
//! let report = pipeline.run(JobInput::new(job_id, sections, brief, business)).await?;
//! println!("reverted {} passes", report.history.revert_count());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod collaborators;
mod config;
mod error;
mod pipeline;
mod retry;
mod telemetry;
mod types;

pub use collaborators::{CheckpointStore, ContentGenerator, InMemoryCheckpointStore, RuleEvaluator};
pub use config::{LoggingConfig, PipelineConfig, RetryConfig, ReviewHandling, ValidatorConfig};
pub use error::{ConfigError, PipelineError, PipelineResult};
pub use pipeline::{plan, PassPipeline};
pub use retry::with_retry;
pub use telemetry::init_tracing;
pub use types::{
    CancellationFlag, Checkpoint, JobInput, JobPlan, PassRequest, PipelineReport,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the pipeline
    pub use crate::{
        CheckpointStore, ContentGenerator, InMemoryCheckpointStore, JobInput, PassPipeline,
        PipelineConfig, PipelineError, RuleEvaluator,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
