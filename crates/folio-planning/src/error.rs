//! Error types for planning inputs
//!
//! Planning itself never fails: unknown inputs degrade to documented
//! defaults. These errors only surface from strict parsing.

/// Strict parse failure for a planning signal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanningError {
    #[error("unknown {kind}: {value}")]
    Unknown { kind: &'static str, value: String },
}

impl PlanningError {
    #[inline]
    #[must_use]
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::Unknown {
            kind,
            value: value.into(),
        }
    }
}
