//! siftdb - a deterministic query evaluator over keyed record stores.
//!
//! Callers name a store, supply URL-style parameter pairs and receive
//! the matching records, their primary keys, or a keyed map. Filters
//! compile into primary-key cursors, secondary-index cursors or property
//! scans, and a streaming merge-join combines them under `and`/`or`
//! semantics with offset, limit and ordering controls.
//!
//! ```
//! use serde_json::json;
//! use siftdb::{Catalog, Evaluator, MemoryStore, StoreSchema};
//!
//! # async fn demo() -> Result<(), siftdb::QueryError> {
//! let schema = StoreSchema::new("files", "pk").with_index("group", "group");
//! let catalog = Catalog::new().with_store(schema.clone());
//!
//! let mut store = MemoryStore::new();
//! store.create_store(schema);
//! store.insert("files", json!({"pk": "a", "group": "aaa"}))?;
//!
//! let evaluator = Evaluator::new(store, catalog);
//! let result = evaluator.query("files", "group=aaa&$format=keys").await?;
//! assert_eq!(result.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod errors;
pub mod exec;
pub mod params;
pub mod path;
pub mod plan;
pub mod query;
pub mod schema;
pub mod store;

pub use cancel::CancelToken;
pub use errors::{ErrorKind, QueryError, QueryResult};
pub use exec::QueryOutput;
pub use params::{
    Controls, JoinMode, OutputFormat, ParamError, ParamSet, ParsedQuery, Predicate, PredicateOp,
};
pub use path::Path;
pub use query::{Evaluator, ParamInput};
pub use schema::{Catalog, IndexDef, StoreSchema};
pub use store::{Key, KeyRange, MemoryStore, StoreCursor, StoreError, StoreHandle, StoreProvider};
