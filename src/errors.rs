//! Crate-level query errors.
//!
//! A query fails as a whole: parsing errors surface immediately, cursor
//! and materialization errors abort the query after releasing resources,
//! and there is no partial-success shape.

use thiserror::Error;

use crate::cancel::CancelToken;
use crate::params::ParamError;
use crate::store::StoreError;

/// Result type for query evaluation.
pub type QueryResult<T> = Result<T, QueryError>;

/// Everything a query can fail with.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// Malformed parameters or control values.
    #[error(transparent)]
    InvalidArgument(#[from] ParamError),

    /// The store name is not in the catalog.
    #[error("unknown store '{0}'")]
    SchemaMismatch(String),

    /// The backend has no such store. Unknown index targets never land
    /// here; they demote to property scans during classification.
    #[error("store not found: {0}")]
    NotFound(String),

    /// An error propagated from the store collaborator.
    #[error("store error: {0}")]
    Store(StoreError),

    /// Cancellation observed at a suspension point.
    #[error("query cancelled")]
    Cancelled,

    /// An internal invariant was violated; indicates a bug.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// Coarse classification of a query error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad parameters
    InvalidArgument,
    /// Store name unknown to the catalog
    SchemaMismatch,
    /// Store missing in the backend
    NotFound,
    /// Backend failure
    Store,
    /// Caller-initiated cancellation
    Cancelled,
    /// Bug
    Internal,
}

impl QueryError {
    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            QueryError::SchemaMismatch(_) => ErrorKind::SchemaMismatch,
            QueryError::NotFound(_) => ErrorKind::NotFound,
            QueryError::Store(_) => ErrorKind::Store,
            QueryError::Cancelled => ErrorKind::Cancelled,
            QueryError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Fails with `Cancelled` once the token has been signalled.
    pub(crate) fn guard(cancel: &CancelToken) -> QueryResult<()> {
        if cancel.is_cancelled() {
            Err(QueryError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::StoreNotFound(name) => QueryError::NotFound(name),
            other => QueryError::Store(other),
        }
    }
}
