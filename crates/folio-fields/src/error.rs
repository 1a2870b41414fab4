//! Error types for the field collector
//!
//! Missing fields before the last pass are an expected state, so
//! [`FieldsError::Incomplete`] is kept apart from input errors.

/// Field collection and emission errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldsError {
    /// Required fields have not been collected yet
    #[error("structured data incomplete, missing: {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },

    /// Passes are numbered from 1
    #[error("invalid pass number: {0}")]
    InvalidPass(u32),
}

impl FieldsError {
    /// Whether later passes may still resolve the error
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Incomplete { .. })
    }
}

/// Result alias for field operations
pub type FieldsResult<T> = Result<T, FieldsError>;
