//! Natural-order sorting for `$orderBy`.
//!
//! Numbers compare numerically, strings lexicographically, absent values
//! sort last. Mixed present types rank as null < bool < number < string
//! < array < object. The sort itself is stable, so ties keep the join's
//! primary-key order.

use std::cmp::Ordering;

use serde_json::Value;

use crate::path::Path;

/// Compares two resolved values under the natural ordering.
pub fn natural_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let rank_a = type_rank(a);
            let rank_b = type_rank(b);
            if rank_a != rank_b {
                return rank_a.cmp(&rank_b);
            }
            match (a, b) {
                (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
                (Value::Number(a), Value::Number(b)) => {
                    let a = a.as_f64().unwrap_or(0.0);
                    let b = b.as_f64().unwrap_or(0.0);
                    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
                }
                (Value::String(a), Value::String(b)) => a.cmp(b),
                _ => Ordering::Equal,
            }
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Compares two records by the value at `path`.
pub fn compare_by_path(path: &Path, a: &Value, b: &Value) -> Ordering {
    natural_cmp(path.resolve(a), path.resolve(b))
}

/// Stable in-place sort of records by the value at `path`.
pub fn sort_records(records: &mut [Value], path: &Path) {
    records.sort_by(|a, b| compare_by_path(path, a, b));
}
