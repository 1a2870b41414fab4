//! Sequential pass pipeline
//!
//! Drives one job through its passes:
//! - Snapshots the rules before and after every pass
//! - Reverts whole passes the regression detector rejects
//! - Accumulates progressive fields from applied passes only
//! - Checkpoints at every pass boundary so a cancelled job can resume
//! - Validates the assembled document before export
//!
//! Passes of one job never overlap. Separate jobs share nothing but the
//! collaborators and may run concurrently through [`PassPipeline::run_many`].

use crate::collaborators::{CheckpointStore, ContentGenerator, RuleEvaluator};
use crate::config::{PipelineConfig, ReviewHandling};
use crate::error::{PipelineError, PipelineResult};
use crate::retry::with_retry;
use crate::types::{Checkpoint, JobInput, JobPlan, PassRequest, PipelineReport};
use folio_content::{
    readability_score, render_markdown, summarize_with, validate, ContentStructureExtractor,
    PatternExtractor, Section, ValidateOptions,
};
use folio_fields::{emit_structured_data, event_for_pass, FieldLog, FieldsError, PassInputs};
use folio_planning::{select, suggest};
use folio_snapshot::{
    compare_checked, revert_reason, JobId, PassDelta, PassHistory, PassOutcome,
    Recommendation, RuleSnapshot, SnapshotKind,
};
use futures::future::join_all;
use std::sync::Arc;

/// Job state carried from pass to pass
#[derive(Debug)]
struct JobState {
    completed: u32,
    sections: Vec<Section>,
    field_log: FieldLog,
    accepted: Option<RuleSnapshot>,
    history: PassHistory,
}

impl JobState {
    fn fresh(job: &JobInput) -> Self {
        Self {
            completed: 0,
            sections: job.sections.clone(),
            field_log: FieldLog::new(),
            accepted: None,
            history: PassHistory::new(job.job_id.clone()),
        }
    }

    fn from_checkpoint(checkpoint: Checkpoint) -> Self {
        Self {
            completed: checkpoint.pass_number,
            sections: checkpoint.sections,
            field_log: checkpoint.field_log,
            accepted: checkpoint.accepted_snapshot,
            history: checkpoint.history,
        }
    }

    fn checkpoint(&self, job_id: &JobId) -> Checkpoint {
        Checkpoint {
            job_id: job_id.clone(),
            pass_number: self.completed,
            sections: self.sections.clone(),
            field_log: self.field_log.clone(),
            accepted_snapshot: self.accepted.clone(),
            history: self.history.clone(),
        }
    }
}

/// Whether the job continues after a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassStep {
    Continue,
    Halt,
}

/// Depth and template decisions for `job`, made once before the first pass
#[must_use]
pub fn plan(job: &JobInput) -> JobPlan {
    JobPlan {
        depth: job.depth.as_ref().map(suggest),
        template: job.template.as_ref().map(select),
    }
}

/// Quality score from the share of passing rules, 0-100
fn quality_score(snapshot: &RuleSnapshot) -> Option<f64> {
    let total = snapshot.rules().len();
    if total == 0 {
        return None;
    }
    let ratio = snapshot.passing_count() as f64 / total as f64;
    Some((ratio * 1000.0).round() / 10.0)
}

/// Pipeline over pluggable collaborators
pub struct PassPipeline {
    config: PipelineConfig,
    generator: Arc<dyn ContentGenerator>,
    evaluator: Arc<dyn RuleEvaluator>,
    store: Arc<dyn CheckpointStore>,
    extractor: Arc<dyn ContentStructureExtractor>,
}

impl std::fmt::Debug for PassPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PassPipeline {
    /// Create a pipeline with the pattern-based structure extractor
    ///
    /// # Errors
    /// Returns [`PipelineError::Config`] if `config` fails validation.
    pub fn new(
        config: PipelineConfig,
        generator: Arc<dyn ContentGenerator>,
        evaluator: Arc<dyn RuleEvaluator>,
        store: Arc<dyn CheckpointStore>,
    ) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            generator,
            evaluator,
            store,
            extractor: Arc::new(PatternExtractor::new()),
        })
    }

    /// Replace the structure extractor used for summaries and fields
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn ContentStructureExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run `job` from its first pass
    ///
    /// # Errors
    /// - [`PipelineError::Cancelled`] when the job's flag is set at a pass boundary
    /// - collaborator errors once retries are exhausted
    pub async fn run(&self, job: JobInput) -> PipelineResult<PipelineReport> {
        let state = JobState::fresh(&job);
        self.drive(job, state).await
    }

    /// Continue `job` after its last checkpoint, or from the start if none
    ///
    /// # Errors
    /// Same as [`PassPipeline::run`], plus [`PipelineError::Store`] if the
    /// checkpoint cannot be loaded.
    pub async fn resume(&self, job: JobInput) -> PipelineResult<PipelineReport> {
        let checkpoint = self
            .store
            .load_checkpoint(&job.job_id)
            .await
            .map_err(PipelineError::store)?;

        let state = match checkpoint {
            Some(checkpoint) => {
                tracing::info!(
                    job_id = %job.job_id,
                    last_completed_pass = checkpoint.pass_number,
                    "resuming from checkpoint"
                );
                JobState::from_checkpoint(checkpoint)
            }
            None => JobState::fresh(&job),
        };
        self.drive(job, state).await
    }

    /// Run independent jobs concurrently
    pub async fn run_many(&self, jobs: Vec<JobInput>) -> Vec<PipelineResult<PipelineReport>> {
        join_all(jobs.into_iter().map(|job| self.run(job))).await
    }

    async fn drive(&self, job: JobInput, mut state: JobState) -> PipelineResult<PipelineReport> {
        let plan = plan(&job);
        let start = state.completed + 1;
        tracing::info!(
            job_id = %job.job_id,
            start,
            pass_count = self.config.pass_count,
            "job started"
        );

        let mut halted_at = None;
        for pass in start..=self.config.pass_count {
            if job.cancellation.is_cancelled() {
                tracing::info!(job_id = %job.job_id, last_completed_pass = state.completed, "job cancelled");
                return Err(PipelineError::Cancelled {
                    job_id: job.job_id.clone(),
                    last_completed_pass: state.completed,
                });
            }

            if self.run_pass(&job, &plan, &mut state, pass).await? == PassStep::Halt {
                halted_at = Some(pass);
                break;
            }
        }

        self.finish(job, plan, state, halted_at)
    }

    async fn run_pass(
        &self,
        job: &JobInput,
        plan: &JobPlan,
        state: &mut JobState,
        pass: u32,
    ) -> PipelineResult<PassStep> {
        tracing::debug!(job_id = %job.job_id, pass, "pass started");

        let before = self
            .evaluate(&job.job_id, pass, SnapshotKind::Before, &state.sections)
            .await?;
        self.store
            .save_snapshot(&before)
            .await
            .map_err(PipelineError::store)?;

        let summary = summarize_with(
            self.extractor.as_ref(),
            &state.sections,
            &job.brief,
            &job.business,
        );
        metrics::histogram!("folio_summary_bytes").record(summary.serialized_len() as f64);

        let request = PassRequest {
            job_id: job.job_id.clone(),
            pass_number: pass,
            sections: state.sections.clone(),
            summary,
            brief: job.brief.clone(),
            business: job.business.clone(),
            plan: plan.clone(),
        };
        let candidate = self.generate(&request).await?;

        let after = self
            .evaluate(&job.job_id, pass, SnapshotKind::After, &candidate)
            .await?;
        self.store
            .save_snapshot(&after)
            .await
            .map_err(PipelineError::store)?;

        let delta = compare_checked(&before, &after, &self.config.review)?;
        metrics::counter!("folio_passes_total", "outcome" => delta.recommendation.to_string())
            .increment(1);

        let Some(outcome) = self.decide(&job.job_id, &delta) else {
            return Ok(PassStep::Halt);
        };

        // Every fallible step runs before the state changes
        let event = match outcome {
            PassOutcome::Applied => {
                let inputs = PassInputs::new(&candidate, &job.brief, &job.business)
                    .with_scores(quality_score(&after), readability_score(&candidate));
                Some(event_for_pass(self.extractor.as_ref(), pass, &inputs)?)
            }
            PassOutcome::Reverted => None,
        };
        state.history.record(delta, outcome)?;

        if outcome == PassOutcome::Applied {
            if let Some(event) = event {
                state.field_log.append(event);
            }
            state.sections = candidate;
            state.accepted = Some(after);
        }
        state.completed = pass;

        self.store
            .save_checkpoint(&state.checkpoint(&job.job_id))
            .await
            .map_err(PipelineError::store)?;

        tracing::debug!(job_id = %job.job_id, pass, outcome = ?outcome, "pass finished");
        Ok(PassStep::Continue)
    }

    /// `None` when the job must halt for review
    fn decide(&self, job_id: &JobId, delta: &PassDelta) -> Option<PassOutcome> {
        let pass = delta.pass_number;
        match delta.recommendation {
            Recommendation::Accept => {
                tracing::info!(
                    job_id = %job_id,
                    pass,
                    fixed = delta.fixed.len(),
                    net_change = delta.net_change,
                    "pass accepted"
                );
                Some(PassOutcome::Applied)
            }
            Recommendation::Revert => {
                tracing::warn!(
                    job_id = %job_id,
                    pass,
                    reason = %revert_reason(delta).unwrap_or_default(),
                    "pass reverted"
                );
                Some(PassOutcome::Reverted)
            }
            Recommendation::Review => {
                tracing::info!(
                    job_id = %job_id,
                    pass,
                    regressed = ?delta.regressed,
                    net_change = delta.net_change,
                    handling = ?self.config.review_handling,
                    "pass needs review"
                );
                match self.config.review_handling {
                    ReviewHandling::Accept => Some(PassOutcome::Applied),
                    ReviewHandling::Revert => Some(PassOutcome::Reverted),
                    ReviewHandling::Halt => None,
                }
            }
        }
    }

    async fn generate(&self, request: &PassRequest) -> PipelineResult<Vec<Section>> {
        let generator = self.generator.as_ref();
        let pass = request.pass_number;
        with_retry(
            &self.config.retry,
            self.config.collaborator_timeout(),
            "generate",
            move |_| async move {
                generator
                    .generate(request)
                    .await
                    .map_err(|e| PipelineError::generation(pass, e))
            },
        )
        .await
    }

    async fn evaluate(
        &self,
        job_id: &JobId,
        pass: u32,
        kind: SnapshotKind,
        sections: &[Section],
    ) -> PipelineResult<RuleSnapshot> {
        let evaluator = self.evaluator.as_ref();
        with_retry(
            &self.config.retry,
            self.config.collaborator_timeout(),
            "evaluate",
            move |_| async move {
                evaluator
                    .evaluate(job_id, pass, kind, sections)
                    .await
                    .map_err(|e| PipelineError::evaluation(pass, e))
            },
        )
        .await
    }

    fn finish(
        &self,
        job: JobInput,
        plan: JobPlan,
        state: JobState,
        halted_at: Option<u32>,
    ) -> PipelineResult<PipelineReport> {
        let title = Some(job.brief.title.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let assembled = render_markdown(title.as_deref(), &state.sections);

        let options = ValidateOptions {
            auto_fix: self.config.validator.auto_fix,
            title,
        };
        let validation = validate(&assembled, &options);
        let (content, revalidation) = match &validation.fixed_content {
            Some(fixed) => {
                let revalidation = validate(fixed, &ValidateOptions::default());
                (fixed.clone(), Some(revalidation))
            }
            None => (assembled, None),
        };
        tracing::info!(
            job_id = %job.job_id,
            valid = validation.valid,
            issues = validation.issues.len(),
            removed = validation.removed_count,
            exportable = revalidation.as_ref().map_or(validation.valid, |r| r.valid),
            "pre-publish validation"
        );

        let fields = state.field_log.current();
        let structured_data = match emit_structured_data(&fields) {
            Ok(value) => Some(value),
            Err(FieldsError::Incomplete { missing }) => {
                tracing::debug!(job_id = %job.job_id, ?missing, "structured data not emitted");
                None
            }
            Err(err) => return Err(err.into()),
        };

        tracing::info!(
            job_id = %job.job_id,
            completed = state.completed,
            reverted = state.history.revert_count(),
            "job finished"
        );

        Ok(PipelineReport {
            job_id: job.job_id,
            sections: state.sections,
            history: state.history,
            fields,
            structured_data,
            plan,
            content,
            validation,
            revalidation,
            halted_at,
        })
    }
}
