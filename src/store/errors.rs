//! Store collaborator errors.
//!
//! Everything the evaluator can observe from a backend funnels through
//! `StoreError`; the query layer maps it onto its own error kinds.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a store backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The named store does not exist in the backend.
    #[error("store not found: {0}")]
    StoreNotFound(String),

    /// The named index is not declared on the store.
    #[error("index not found: {0}")]
    IndexNotFound(String),

    /// A cursor failed to open or advance.
    #[error("cursor error: {0}")]
    Cursor(String),

    /// A point read failed.
    #[error("read error: {0}")]
    Read(String),

    /// A record produced no usable primary key at the schema path.
    #[error("record has no primary key at '{path}'")]
    MissingPrimaryKey {
        /// The schema-declared primary-key path
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StoreError::StoreNotFound("files".into());
        assert_eq!(err.to_string(), "store not found: files");

        let err = StoreError::MissingPrimaryKey { path: "pk".into() };
        assert!(err.to_string().contains("pk"));
    }
}
