//! Dotted-path resolution over JSON records.
//!
//! A path like `value.title` is compiled once per query into its segment
//! list and then walked per record. Resolution never fails: a missing or
//! non-traversable segment yields `None`, and every comparison against an
//! absent value is false.

use std::fmt;

use serde_json::Value;

/// A compiled dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    raw: String,
    segments: Vec<String>,
}

impl Path {
    /// Compiles a dotted path. Splitting happens here, not per record.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = raw.split('.').map(str::to_string).collect();
        Self { raw, segments }
    }

    /// Returns the original dotted form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the compiled segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walks the record one segment at a time.
    ///
    /// Returns `None` when any intermediate value is absent or not an
    /// object. An explicit JSON `null` leaf is returned as `Some(Null)`;
    /// predicate evaluation treats it as a non-match.
    pub fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        let mut current = record;
        for segment in &self.segments {
            match current {
                Value::Object(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
