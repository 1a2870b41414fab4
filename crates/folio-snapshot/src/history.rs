//! Per-job record of pass outcomes

use crate::error::SnapshotError;
use crate::regression::{PassDelta, Recommendation};
use crate::snapshot::JobId;
use serde::{Deserialize, Serialize};

/// Whether a pass's output ended up in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassOutcome {
    /// New content replaced the previous content
    Applied,
    /// Previous content and snapshot were restored
    Reverted,
}

/// One recorded pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub delta: PassDelta,
    pub outcome: PassOutcome,
}

/// Ordered delta history owned by a single job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassHistory {
    job_id: JobId,
    entries: Vec<HistoryEntry>,
}

impl PassHistory {
    /// Empty history for `job_id`
    #[inline]
    #[must_use]
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            entries: Vec::new(),
        }
    }

    /// Append a pass outcome
    ///
    /// # Errors
    /// Returns [`SnapshotError::OutOfOrder`] unless the pass number is
    /// greater than the last recorded one.
    pub fn record(&mut self, delta: PassDelta, outcome: PassOutcome) -> Result<(), SnapshotError> {
        if let Some(last) = self.entries.last() {
            if delta.pass_number <= last.delta.pass_number {
                return Err(SnapshotError::OutOfOrder {
                    pass: delta.pass_number,
                    last: last.delta.pass_number,
                });
            }
        }
        self.entries.push(HistoryEntry { delta, outcome });
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Highest pass whose output was applied
    #[must_use]
    pub fn last_accepted_pass(&self) -> Option<u32> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.outcome == PassOutcome::Applied)
            .map(|e| e.delta.pass_number)
    }

    /// Number of reverted passes
    #[must_use]
    pub fn revert_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == PassOutcome::Reverted)
            .count()
    }

    /// Passes that were flagged for human review
    pub fn review_passes(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries
            .iter()
            .filter(|e| e.delta.recommendation == Recommendation::Review)
            .map(|e| e.delta.pass_number)
    }

    /// Fixed rules summed over applied passes
    #[must_use]
    pub fn total_fixed(&self) -> usize {
        self.applied().map(|d| d.fixed.len()).sum()
    }

    /// Regressed rules summed over applied passes
    #[must_use]
    pub fn total_regressed(&self) -> usize {
        self.applied().map(|d| d.regressed.len()).sum()
    }

    fn applied(&self) -> impl Iterator<Item = &PassDelta> {
        self.entries
            .iter()
            .filter(|e| e.outcome == PassOutcome::Applied)
            .map(|e| &e.delta)
    }
}
