//! Builder-style parameter construction.
//!
//! Renders to the same wire pairs the URL form decodes into, so a built
//! parameter set and its URL equivalent take the identical path through
//! the parser.

use super::controls::{JoinMode, OutputFormat};

/// A programmatically-built parameter set.
#[derive(Debug, Clone, Default)]
pub struct ParamSet {
    pairs: Vec<(String, String)>,
}

impl ParamSet {
    /// Starts an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality filter on a target.
    pub fn eq(mut self, target: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((target.into(), value.into()));
        self
    }

    /// Prefix filter on a target.
    pub fn prefix(mut self, target: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((format!("{}$prefix", target.into()), value.into()));
        self
    }

    /// Inclusive lower bound on a target.
    pub fn from(mut self, target: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((format!("{}$from", target.into()), value.into()));
        self
    }

    /// Inclusive upper bound on a target.
    pub fn to(mut self, target: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((format!("{}$to", target.into()), value.into()));
        self
    }

    /// Join mode (`$join`).
    pub fn join(mut self, mode: JoinMode) -> Self {
        self.pairs.push(("$join".into(), mode.as_str().into()));
        self
    }

    /// Skip the first `n` matches (`$from`).
    pub fn skip(mut self, n: u64) -> Self {
        self.pairs.push(("$from".into(), n.to_string()));
        self
    }

    /// Stop past match offset `n` (`$to`).
    pub fn until(mut self, n: u64) -> Self {
        self.pairs.push(("$to".into(), n.to_string()));
        self
    }

    /// Cap the result length (`$limit`).
    pub fn limit(mut self, n: u64) -> Self {
        self.pairs.push(("$limit".into(), n.to_string()));
        self
    }

    /// Output shape (`$format`).
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.pairs.push(("$format".into(), format.as_str().into()));
        self
    }

    /// Re-sort by a record path (`$orderBy`).
    pub fn order_by(mut self, path: impl Into<String>) -> Self {
        self.pairs.push(("$orderBy".into(), path.into()));
        self
    }

    /// The wire pairs this set renders to.
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}
