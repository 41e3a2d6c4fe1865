//! Parameter parsing errors.
//!
//! Every variant is an invalid-argument condition: the query is rejected
//! before any cursor opens.

use thiserror::Error;

/// Result type for parameter parsing.
pub type ParamResult<T> = Result<T, ParamError>;

/// Rejections produced while parsing the parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// Key does not follow the parameter grammar.
    #[error("malformed parameter key: '{0}'")]
    MalformedKey(String),

    /// Unrecognized operator suffix on a target.
    #[error("unknown operator '{op}' on '{target}'")]
    UnknownOperator {
        /// The filter target
        target: String,
        /// The operator suffix that was not recognized
        op: String,
    },

    /// `$join` must be `and` or `or`.
    #[error("invalid $join value: '{0}'")]
    InvalidJoin(String),

    /// `$format` must be `records`, `keys` or `lookup`.
    #[error("invalid $format value: '{0}'")]
    InvalidFormat(String),

    /// `$from`, `$to` and `$limit` must be non-negative integers.
    #[error("{control} must be a non-negative integer, got '{value}'")]
    InvalidNumber {
        /// The control parameter name
        control: &'static str,
        /// The rejected value
        value: String,
    },

    /// A prefix predicate needs a non-empty prefix.
    #[error("empty prefix for '{0}'")]
    EmptyPrefix(String),

    /// The paging window is inverted.
    #[error("$to ({to}) must not be less than $from ({from})")]
    WindowInverted {
        /// The requested start offset
        from: u64,
        /// The requested end offset
        to: u64,
    },

    /// A parameter failed percent-decoding.
    #[error("undecodable parameter: {0}")]
    InvalidEncoding(String),
}
