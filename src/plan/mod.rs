//! Cursor classification.
//!
//! Each predicate resolves to one of three execution strategies against
//! the store: a primary-key cursor, a secondary-index cursor, or a full
//! property scan. Classification also builds the concrete key range the
//! cursor opens with; prefix predicates become a lower-bounded range plus
//! a stop condition applied by the cursor driver.

use std::fmt::Write as _;

use tracing::trace;

use crate::params::{Predicate, PredicateOp};
use crate::path::Path;
use crate::schema::StoreSchema;
use crate::store::{Key, KeyRange};

/// The execution strategy chosen for one predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Range scan over the primary key space.
    Primary {
        /// Key range the cursor opens with
        range: KeyRange,
        /// Stop once the cursor key no longer starts with this
        prefix: Option<String>,
    },
    /// Range scan over a declared secondary index.
    Index {
        /// The index name
        index: String,
        /// Key range the cursor opens with
        range: KeyRange,
        /// Stop once the index key no longer starts with this
        prefix: Option<String>,
    },
    /// Full primary-key sweep with a per-record match.
    Scan {
        /// Compiled record path of the tested value
        path: Path,
        /// The predicate evaluated at each row
        op: PredicateOp,
    },
}

impl Strategy {
    /// Short name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Strategy::Primary { .. } => "primary",
            Strategy::Index { .. } => "index",
            Strategy::Scan { .. } => "scan",
        }
    }
}

/// One cursor to open, tied back to its parameter target.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorPlan {
    /// The parameter target this cursor serves.
    pub target: String,
    /// How the cursor executes.
    pub strategy: Strategy,
}

/// The cursors a query opens, in deterministic order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPlan {
    /// One entry per predicate.
    pub cursors: Vec<CursorPlan>,
}

impl QueryPlan {
    /// A compact human-readable rendering of the chosen strategies.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for plan in &self.cursors {
            let _ = writeln!(out, "{} -> {}", plan.target, plan.strategy.kind());
        }
        out
    }
}

/// Classifies every predicate against the store schema.
///
/// Targets equal to the primary-key path use a primary cursor; targets
/// naming a declared index use an index cursor; anything else demotes to
/// a property scan. An unknown target is never an error.
pub fn classify(schema: &StoreSchema, predicates: &[Predicate]) -> QueryPlan {
    let cursors = predicates
        .iter()
        .map(|predicate| {
            let strategy = classify_one(schema, predicate);
            trace!(
                target = predicate.target.as_str(),
                strategy = strategy.kind(),
                op = predicate.op.name(),
                "classified predicate"
            );
            CursorPlan {
                target: predicate.target.clone(),
                strategy,
            }
        })
        .collect();
    QueryPlan { cursors }
}

fn classify_one(schema: &StoreSchema, predicate: &Predicate) -> Strategy {
    if predicate.target == schema.primary_key_path {
        let (range, prefix) = range_for(&predicate.op);
        Strategy::Primary { range, prefix }
    } else if schema.index(&predicate.target).is_some() {
        let (range, prefix) = range_for(&predicate.op);
        Strategy::Index {
            index: predicate.target.clone(),
            range,
            prefix,
        }
    } else {
        Strategy::Scan {
            path: Path::new(predicate.target.clone()),
            op: predicate.op.clone(),
        }
    }
}

fn range_for(op: &PredicateOp) -> (KeyRange, Option<String>) {
    match op {
        PredicateOp::Equal(key) => (KeyRange::Only(key.clone()), None),
        PredicateOp::Prefix(prefix) => (
            KeyRange::From(Key::from_string(prefix.clone())),
            Some(prefix.clone()),
        ),
        PredicateOp::Range { lo, hi } => (KeyRange::from_bounds(lo.clone(), hi.clone()), None),
    }
}
