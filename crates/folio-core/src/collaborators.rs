//! External collaborators of the pipeline
//!
//! Generation, rule evaluation and persistence sit behind async traits so a
//! queue worker, a serverless handler or an in-process loop can supply its
//! own. Implementations report failures as [`anyhow::Error`]; the pipeline
//! attributes them to the pass that made the call.

use crate::types::{Checkpoint, PassRequest};
use async_trait::async_trait;
use dashmap::DashMap;
use folio_content::Section;
use folio_snapshot::{JobId, RuleSnapshot, SnapshotKind};

/// Rewrites or augments sections for one pass
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Produce the candidate sections for `request.pass_number`
    async fn generate(&self, request: &PassRequest) -> anyhow::Result<Vec<Section>>;
}

/// Evaluates the quality rules against document content
#[async_trait]
pub trait RuleEvaluator: Send + Sync {
    /// Snapshot of every rule for `sections`
    async fn evaluate(
        &self,
        job_id: &JobId,
        pass_number: u32,
        kind: SnapshotKind,
        sections: &[Section],
    ) -> anyhow::Result<RuleSnapshot>;
}

/// Durable storage for snapshots and checkpoints
///
/// Snapshots are keyed by `(job, pass, kind)`, checkpoints by job.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn save_snapshot(&self, snapshot: &RuleSnapshot) -> anyhow::Result<()>;

    async fn load_snapshot(
        &self,
        job_id: &JobId,
        pass_number: u32,
        kind: SnapshotKind,
    ) -> anyhow::Result<Option<RuleSnapshot>>;

    /// Replace the job's checkpoint
    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> anyhow::Result<()>;

    async fn load_checkpoint(&self, job_id: &JobId) -> anyhow::Result<Option<Checkpoint>>;
}

type SnapshotKey = (JobId, u32, SnapshotKind);

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    snapshots: DashMap<SnapshotKey, RuleSnapshot>,
    checkpoints: DashMap<JobId, Checkpoint>,
}

impl InMemoryCheckpointStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots across all jobs
    #[inline]
    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Drop everything stored for `job_id`
    pub fn forget(&self, job_id: &JobId) {
        self.checkpoints.remove(job_id);
        self.snapshots.retain(|(job, _, _), _| job != job_id);
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn save_snapshot(&self, snapshot: &RuleSnapshot) -> anyhow::Result<()> {
        let key = (
            snapshot.job_id().clone(),
            snapshot.pass_number(),
            snapshot.kind(),
        );
        self.snapshots.insert(key, snapshot.clone());
        Ok(())
    }

    async fn load_snapshot(
        &self,
        job_id: &JobId,
        pass_number: u32,
        kind: SnapshotKind,
    ) -> anyhow::Result<Option<RuleSnapshot>> {
        let key = (job_id.clone(), pass_number, kind);
        Ok(self.snapshots.get(&key).map(|entry| entry.value().clone()))
    }

    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> anyhow::Result<()> {
        self.checkpoints
            .insert(checkpoint.job_id.clone(), checkpoint.clone());
        Ok(())
    }

    async fn load_checkpoint(&self, job_id: &JobId) -> anyhow::Result<Option<Checkpoint>> {
        Ok(self
            .checkpoints
            .get(job_id)
            .map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_fields::FieldLog;
    use folio_snapshot::{ContentHash, PassHistory, RuleStatus, Severity};
    use std::collections::BTreeMap;

    fn snapshot(job: &str, pass: u32, kind: SnapshotKind) -> RuleSnapshot {
        let mut rules = BTreeMap::new();
        rules.insert("R1".to_string(), RuleStatus::pass(Severity::Warning));
        RuleSnapshot::new(JobId::new(job), pass, kind, rules, ContentHash::compute(b"doc")).unwrap()
    }

    #[tokio::test]
    async fn snapshots_are_keyed_by_job_pass_and_kind() {
        let store = InMemoryCheckpointStore::new();
        store.save_snapshot(&snapshot("a", 1, SnapshotKind::Before)).await.unwrap();
        store.save_snapshot(&snapshot("a", 1, SnapshotKind::After)).await.unwrap();
        store.save_snapshot(&snapshot("b", 1, SnapshotKind::Before)).await.unwrap();
        assert_eq!(store.snapshot_count(), 3);

        let job = JobId::new("a");
        let loaded = store.load_snapshot(&job, 1, SnapshotKind::After).await.unwrap();
        assert_eq!(loaded.map(|s| s.kind()), Some(SnapshotKind::After));
        assert!(store.load_snapshot(&job, 2, SnapshotKind::Before).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn checkpoint_is_replaced_and_forgotten() {
        let store = InMemoryCheckpointStore::new();
        let job = JobId::new("a");
        let mut checkpoint = Checkpoint {
            job_id: job.clone(),
            pass_number: 1,
            sections: Vec::new(),
            field_log: FieldLog::new(),
            accepted_snapshot: None,
            history: PassHistory::new(job.clone()),
        };
        store.save_checkpoint(&checkpoint).await.unwrap();
        checkpoint.pass_number = 2;
        store.save_checkpoint(&checkpoint).await.unwrap();

        let loaded = store.load_checkpoint(&job).await.unwrap().unwrap();
        assert_eq!(loaded.pass_number, 2);

        store.save_snapshot(&snapshot("a", 1, SnapshotKind::Before)).await.unwrap();
        store.forget(&job);
        assert!(store.load_checkpoint(&job).await.unwrap().is_none());
        assert_eq!(store.snapshot_count(), 0);
    }
}
