//! Rule snapshots
//!
//! A [`RuleSnapshot`] records, for one job and one pass, which quality rules
//! were passing at a single instant. Rules absent from a snapshot are treated
//! as passing when two snapshots are compared; nothing here materializes them.

use crate::error::SnapshotError;
use crate::hash::ContentHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ulid::Ulid;

/// Identifier of one document-generation job
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generate a fresh, sortable job id
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Use an externally assigned id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Rule severity as reported by the rule evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocking problem; a regression at this level is critical
    Error,
    /// Should be fixed
    Warning,
    /// Advisory
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        f.write_str(s)
    }
}

/// Outcome of one rule at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleStatus {
    /// Whether the rule passed
    pub passed: bool,
    /// Severity of the rule
    pub severity: Severity,
    /// Number of violations found (0 when passing)
    pub violation_count: u32,
}

impl RuleStatus {
    /// A passing rule
    #[inline]
    #[must_use]
    pub const fn pass(severity: Severity) -> Self {
        Self {
            passed: true,
            severity,
            violation_count: 0,
        }
    }

    /// A failing rule with `violations` occurrences
    #[inline]
    #[must_use]
    pub const fn fail(severity: Severity, violations: u32) -> Self {
        Self {
            passed: false,
            severity,
            violation_count: violations,
        }
    }
}

/// Whether a snapshot was taken before or after a pass ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    /// Evaluated against the content the pass received
    Before,
    /// Evaluated against the content the pass produced
    After,
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

/// Immutable per-rule state for one job, pass and kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSnapshot {
    job_id: JobId,
    pass_number: u32,
    kind: SnapshotKind,
    rules: BTreeMap<String, RuleStatus>,
    content_hash: ContentHash,
    created_at: DateTime<Utc>,
}

impl RuleSnapshot {
    /// Create a snapshot stamped with the current time
    ///
    /// # Errors
    /// Returns [`SnapshotError::InvalidPassNumber`] for pass 0.
    pub fn new(
        job_id: JobId,
        pass_number: u32,
        kind: SnapshotKind,
        rules: BTreeMap<String, RuleStatus>,
        content_hash: ContentHash,
    ) -> Result<Self, SnapshotError> {
        if pass_number == 0 {
            return Err(SnapshotError::InvalidPassNumber(pass_number));
        }
        Ok(Self {
            job_id,
            pass_number,
            kind,
            rules,
            content_hash,
            created_at: Utc::now(),
        })
    }

    /// Create a snapshot hashing the evaluated content
    ///
    /// # Errors
    /// Returns [`SnapshotError::InvalidPassNumber`] for pass 0.
    pub fn for_content(
        job_id: JobId,
        pass_number: u32,
        kind: SnapshotKind,
        rules: BTreeMap<String, RuleStatus>,
        content: &str,
    ) -> Result<Self, SnapshotError> {
        Self::new(job_id, pass_number, kind, rules, ContentHash::compute(content.as_bytes()))
    }

    /// Same rules re-labelled for another pass and kind
    ///
    /// Used when the accepted "after" state of one pass becomes the "before"
    /// state of the next without re-evaluating unchanged content.
    ///
    /// # Errors
    /// Returns [`SnapshotError::InvalidPassNumber`] for pass 0.
    pub fn relabel(&self, pass_number: u32, kind: SnapshotKind) -> Result<Self, SnapshotError> {
        Self::new(
            self.job_id.clone(),
            pass_number,
            kind,
            self.rules.clone(),
            self.content_hash,
        )
    }

    #[inline]
    #[must_use]
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    #[inline]
    #[must_use]
    pub fn pass_number(&self) -> u32 {
        self.pass_number
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> SnapshotKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn rules(&self) -> &BTreeMap<String, RuleStatus> {
        &self.rules
    }

    #[inline]
    #[must_use]
    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Explicit status of a rule; `None` means untracked (implicitly passing)
    #[inline]
    #[must_use]
    pub fn status(&self, rule_id: &str) -> Option<&RuleStatus> {
        self.rules.get(rule_id)
    }

    /// Whether a rule passes, applying the missing-means-passing baseline
    #[inline]
    #[must_use]
    pub fn is_passing(&self, rule_id: &str) -> bool {
        self.status(rule_id).map_or(true, |s| s.passed)
    }

    /// Ids of explicitly failing rules, sorted
    pub fn failing_rules(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|(_, s)| !s.passed)
            .map(|(id, _)| id.as_str())
    }

    /// Number of explicitly passing rules
    #[must_use]
    pub fn passing_count(&self) -> usize {
        self.rules.values().filter(|s| s.passed).count()
    }

    /// Total violations across failing rules
    #[must_use]
    pub fn total_violations(&self) -> u64 {
        self.rules.values().map(|s| u64::from(s.violation_count)).sum()
    }
}
