//! Query execution.
//!
//! Drivers wrap store cursors into uniform primary-key streams, the
//! merge-join coordinator combines them under `and`/`or` semantics, and
//! the materializer shapes the resulting key list into records, keys or
//! a lookup map.

mod driver;
mod join;
mod materialize;
mod sorter;

pub use driver::CursorDriver;
pub use join::{MergeJoin, ResultWindow};
pub use materialize::{materialize, QueryOutput};
pub use sorter::{compare_by_path, natural_cmp, sort_records};
