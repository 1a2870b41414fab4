//! Core types for the pass pipeline
//!
//! Defines:
//! - Job input and cancellation
//! - The request handed to the content generator for each pass
//! - Durable checkpoints
//! - The final run report

use folio_content::{Brief, BusinessInfo, HolisticSummary, Section, ValidationReport};
use folio_fields::{FieldLog, ProgressiveFields};
use folio_planning::{DepthInput, DepthSuggestion, TemplateInput, TemplateSelection};
use folio_snapshot::{JobId, PassHistory, RuleSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation switch, observed at pass boundaries only
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the running pass still completes
    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One document-generation job
#[derive(Debug, Clone)]
pub struct JobInput {
    pub job_id: JobId,
    /// Sections before the first pass
    pub sections: Vec<Section>,
    pub brief: Brief,
    pub business: BusinessInfo,
    /// Signals for the depth suggestion, when known
    pub depth: Option<DepthInput>,
    /// Signals for template routing, when known
    pub template: Option<TemplateInput>,
    pub cancellation: CancellationFlag,
}

impl JobInput {
    /// Create a job without planning signals
    #[must_use]
    pub fn new(job_id: JobId, sections: Vec<Section>, brief: Brief, business: BusinessInfo) -> Self {
        Self {
            job_id,
            sections,
            brief,
            business,
            depth: None,
            template: None,
            cancellation: CancellationFlag::new(),
        }
    }

    /// With depth signals
    #[inline]
    #[must_use]
    pub fn with_depth(mut self, depth: DepthInput) -> Self {
        self.depth = Some(depth);
        self
    }

    /// With template routing signals
    #[inline]
    #[must_use]
    pub fn with_template(mut self, template: TemplateInput) -> Self {
        self.template = Some(template);
        self
    }

    /// With a cancellation flag shared with the caller
    #[inline]
    #[must_use]
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }
}

/// Planning decisions made once per job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPlan {
    pub depth: Option<DepthSuggestion>,
    pub template: Option<TemplateSelection>,
}

/// Everything the content generator receives for one pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassRequest {
    pub job_id: JobId,
    pub pass_number: u32,
    /// Current sections, in document order
    pub sections: Vec<Section>,
    /// Digest of the whole document, sent instead of the full text
    pub summary: HolisticSummary,
    pub brief: Brief,
    pub business: BusinessInfo,
    pub plan: JobPlan,
}

/// State persisted at every pass boundary
///
/// `sections` and `accepted_snapshot` always describe the last applied
/// content; a reverted pass advances `pass_number` without touching them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub job_id: JobId,
    /// Last completed pass
    pub pass_number: u32,
    pub sections: Vec<Section>,
    pub field_log: FieldLog,
    pub accepted_snapshot: Option<RuleSnapshot>,
    pub history: PassHistory,
}

impl Checkpoint {
    /// Fields derived from the event log
    #[inline]
    #[must_use]
    pub fn fields(&self) -> ProgressiveFields {
        self.field_log.current()
    }
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub job_id: JobId,
    /// Sections after the last applied pass
    pub sections: Vec<Section>,
    pub history: PassHistory,
    pub fields: ProgressiveFields,
    /// JSON-LD, present once the fields are complete
    pub structured_data: Option<serde_json::Value>,
    pub plan: JobPlan,
    /// Markdown intended for export (auto-fixed when enabled)
    pub content: String,
    /// Validation of the assembled document
    pub validation: ValidationReport,
    /// Validation of the auto-fixed document
    pub revalidation: Option<ValidationReport>,
    /// Pass at which a review recommendation stopped the job
    pub halted_at: Option<u32>,
}

impl PipelineReport {
    /// Whether the export content passed validation
    #[must_use]
    pub fn is_exportable(&self) -> bool {
        if self.halted_at.is_some() {
            return false;
        }
        self.revalidation
            .as_ref()
            .map_or(self.validation.valid, |report| report.valid)
    }

    /// Passes whose output was kept
    #[must_use]
    pub fn applied_passes(&self) -> Vec<u32> {
        self.history
            .entries()
            .iter()
            .filter(|e| e.outcome == folio_snapshot::PassOutcome::Applied)
            .map(|e| e.delta.pass_number)
            .collect()
    }
}
