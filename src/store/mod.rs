//! Store collaborator contract.
//!
//! The evaluator never touches a concrete database. It consumes a handle
//! exposing typed cursors, point reads and index metadata; durability and
//! index maintenance belong to the backend. Cursors iterate ascending by
//! their cursor key, with ties broken ascending by primary key; the merge
//! coordinator depends on that contract.

mod errors;
mod key;
mod memory;
mod range;

pub use errors::{StoreError, StoreResult};
pub use key::Key;
pub use memory::{MemoryHandle, MemoryStore};
pub use range::KeyRange;

use async_trait::async_trait;
use serde_json::Value;

/// Opens store handles by name.
#[async_trait]
pub trait StoreProvider: Send + Sync {
    /// The handle type produced by this provider.
    type Handle: StoreHandle;

    /// Open a handle on the named store.
    async fn open(&self, store: &str) -> StoreResult<Self::Handle>;
}

/// An open store: metadata, cursors and point reads.
///
/// Handles are read-only from the evaluator's point of view and may be
/// shared by concurrent queries; each query owns its cursors.
#[async_trait]
pub trait StoreHandle: Send + Sync {
    /// The dotted path holding the primary key of every record.
    fn primary_key_path(&self) -> &str;

    /// Names of the declared secondary indices.
    fn index_names(&self) -> Vec<String>;

    /// Whether the store declares the named index.
    fn has_index(&self, name: &str) -> bool {
        self.index_names().iter().any(|n| n == name)
    }

    /// Open a cursor over the primary key space.
    async fn open_primary_cursor(&self, range: KeyRange) -> StoreResult<Box<dyn StoreCursor>>;

    /// Open a cursor over a secondary index.
    async fn open_index_cursor(
        &self,
        index: &str,
        range: KeyRange,
    ) -> StoreResult<Box<dyn StoreCursor>>;

    /// Read the record stored under a primary key.
    async fn read(&self, key: &Key) -> StoreResult<Option<Value>>;

    /// Read several records; the result aligns with `keys`.
    async fn read_all(&self, keys: &[Key]) -> StoreResult<Vec<Option<Value>>>;

    /// Release the handle.
    async fn close(&self) -> StoreResult<()>;
}

/// A stateful iterator over a contiguous key range.
///
/// While not `done`, a cursor is positioned on a row and exposes its
/// cursor key, the primary key of the pointed record, and the record
/// itself. Index cursors expose the primary key of the pointed record,
/// not the index key, through `current_primary_key`.
#[async_trait]
pub trait StoreCursor: Send + std::fmt::Debug {
    /// Whether the cursor has run off the end of its range.
    fn done(&self) -> bool;

    /// The key the cursor iterates by (primary key or index key).
    fn current_key(&self) -> Option<&Key>;

    /// The primary key of the pointed record.
    fn current_primary_key(&self) -> Option<&Key>;

    /// The pointed record.
    fn current_value(&self) -> Option<&Value>;

    /// Move to the next row. A no-op error-free call once `done`.
    async fn advance(&mut self) -> StoreResult<()>;
}
