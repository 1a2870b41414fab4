//! Error types for snapshot handling
//!
//! Regression outcomes are not errors: `revert` and `review` are returned
//! as [`Recommendation`](crate::Recommendation) values. Errors here cover
//! snapshots that cannot legally be compared or recorded.

use crate::snapshot::{JobId, SnapshotKind};

/// Snapshot and history errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// Passes are numbered from 1
    #[error("invalid pass number: {0}")]
    InvalidPassNumber(u32),

    /// Snapshots belong to different jobs
    #[error("job mismatch: before belongs to {before}, after to {after}")]
    JobMismatch { before: JobId, after: JobId },

    /// Snapshots belong to different passes
    #[error("pass mismatch: before is pass {before}, after is pass {after}")]
    PassMismatch { before: u32, after: u32 },

    /// Snapshot kind is not the one expected in this position
    #[error("snapshot kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: SnapshotKind,
        actual: SnapshotKind,
    },

    /// History entries must arrive in increasing pass order
    #[error("out-of-order pass: {pass} recorded after {last}")]
    OutOfOrder { pass: u32, last: u32 },
}

/// Result alias for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;
