//! Parameter model: predicates and controls.
//!
//! The wire format is URL parameter pairs. A key is either a control
//! (`$join`, `$from`, `$to`, `$limit`, `$format`, `$orderBy`) or a filter
//! target with an optional operator suffix (`value`, `prefix`, `from`,
//! `to`). `from`/`to` on the same target pair into a single range.

mod builder;
mod controls;
mod errors;
mod parser;
mod predicate;

pub use builder::ParamSet;
pub use controls::{Controls, JoinMode, OutputFormat};
pub use errors::{ParamError, ParamResult};
pub use parser::{decode_query_string, parse_pairs, parse_query_string, ParsedQuery};
pub use predicate::{Predicate, PredicateOp};
