//! Folio Snapshot
//!
//! Typed rule snapshots and the before/after comparator that decides,
//! pass by pass, whether a document improved or regressed.
//!
//! # Core Concepts
//!
//! - [`RuleSnapshot`]: per-rule pass/fail state of one job at one pass
//! - [`compare`]: classifies rules as fixed/regressed/unchanged and
//!   recommends accept, revert or review
//! - [`PassHistory`]: the job's ordered record of applied and reverted passes
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_snapshot::{compare, revert_reason, Recommendation};
//!
//! let delta = compare(&before, &after);
//! if delta.recommendation == Recommendation::Revert {
//!     tracing::warn!("{}", revert_reason(&delta).unwrap_or_default());
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod hash;
mod history;
mod regression;
mod snapshot;

pub use error::{SnapshotError, SnapshotResult};
pub use hash::{ContentHash, HashError};
pub use history::{HistoryEntry, PassHistory, PassOutcome};
pub use regression::{
    compare, compare_checked, compare_with_policy, revert_reason, should_revert, PassDelta,
    Recommendation, ReviewPolicy,
};
pub use snapshot::{JobId, RuleSnapshot, RuleStatus, Severity, SnapshotKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
