//! In-memory store backend.
//!
//! A BTreeMap-backed emulation of the collaborator contract, used by the
//! server-side emulation path and throughout the test suite. Ordering is
//! deterministic: rows iterate ascending by primary key, index entries
//! ascending by (index key, primary key). Opening a handle snapshots the
//! store, so live queries never observe concurrent writes.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::Value;

use crate::path::Path;
use crate::schema::StoreSchema;

use super::errors::{StoreError, StoreResult};
use super::key::Key;
use super::range::KeyRange;
use super::{StoreCursor, StoreHandle, StoreProvider};

/// A collection of named in-memory stores.
#[derive(Debug, Default)]
pub struct MemoryStore {
    shards: HashMap<String, Shard>,
}

#[derive(Debug, Clone)]
struct Shard {
    schema: StoreSchema,
    pk_path: Path,
    rows: BTreeMap<Key, Value>,
    /// index name -> index key -> primary keys
    indices: BTreeMap<String, BTreeMap<Key, BTreeSet<Key>>>,
}

impl MemoryStore {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty store for the given schema.
    pub fn create_store(&mut self, schema: StoreSchema) {
        let pk_path = Path::new(schema.primary_key_path.clone());
        let indices = schema
            .indices
            .iter()
            .map(|def| (def.name.clone(), BTreeMap::new()))
            .collect();
        self.shards.insert(
            schema.name.clone(),
            Shard {
                schema,
                pk_path,
                rows: BTreeMap::new(),
                indices,
            },
        );
    }

    /// Inserts or replaces a record, keeping every index current.
    pub fn insert(&mut self, store: &str, record: Value) -> StoreResult<()> {
        let shard = self
            .shards
            .get_mut(store)
            .ok_or_else(|| StoreError::StoreNotFound(store.to_string()))?;

        let pk = shard
            .pk_path
            .resolve(&record)
            .and_then(Key::from_json)
            .ok_or_else(|| StoreError::MissingPrimaryKey {
                path: shard.pk_path.as_str().to_string(),
            })?;

        if let Some(old) = shard.rows.remove(&pk) {
            Self::unindex(shard, &pk, &old);
        }
        Self::index(shard, &pk, &record);
        shard.rows.insert(pk, record);
        Ok(())
    }

    /// Removes a record by primary key. Returns whether it existed.
    pub fn remove(&mut self, store: &str, pk: &Key) -> StoreResult<bool> {
        let shard = self
            .shards
            .get_mut(store)
            .ok_or_else(|| StoreError::StoreNotFound(store.to_string()))?;
        match shard.rows.remove(pk) {
            Some(old) => {
                Self::unindex(shard, pk, &old);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Number of records in a store, if it exists.
    pub fn len(&self, store: &str) -> Option<usize> {
        self.shards.get(store).map(|s| s.rows.len())
    }

    fn index(shard: &mut Shard, pk: &Key, record: &Value) {
        for def in &shard.schema.indices {
            let path = Path::new(def.key_path.clone());
            if let Some(key) = path.resolve(record).and_then(Key::from_json) {
                if let Some(tree) = shard.indices.get_mut(&def.name) {
                    tree.entry(key).or_default().insert(pk.clone());
                }
            }
        }
    }

    fn unindex(shard: &mut Shard, pk: &Key, record: &Value) {
        for def in &shard.schema.indices {
            let path = Path::new(def.key_path.clone());
            if let Some(key) = path.resolve(record).and_then(Key::from_json) {
                if let Some(tree) = shard.indices.get_mut(&def.name) {
                    if let Some(pks) = tree.get_mut(&key) {
                        pks.remove(pk);
                        if pks.is_empty() {
                            tree.remove(&key);
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl StoreProvider for MemoryStore {
    type Handle = MemoryHandle;

    async fn open(&self, store: &str) -> StoreResult<Self::Handle> {
        let shard = self
            .shards
            .get(store)
            .ok_or_else(|| StoreError::StoreNotFound(store.to_string()))?;
        // Snapshot at open time; the handle never sees later writes.
        Ok(MemoryHandle {
            shard: Arc::new(shard.clone()),
        })
    }
}

/// An open snapshot of one in-memory store.
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    shard: Arc<Shard>,
}

#[async_trait]
impl StoreHandle for MemoryHandle {
    fn primary_key_path(&self) -> &str {
        self.shard.schema.primary_key_path.as_str()
    }

    fn index_names(&self) -> Vec<String> {
        self.shard
            .schema
            .indices
            .iter()
            .map(|def| def.name.clone())
            .collect()
    }

    async fn open_primary_cursor(&self, range: KeyRange) -> StoreResult<Box<dyn StoreCursor>> {
        if range.is_empty() {
            return Ok(Box::new(MemoryCursor::new(Vec::new())));
        }
        let entries = self
            .shard
            .rows
            .range(range.bounds())
            .map(|(pk, record)| Entry {
                key: pk.clone(),
                primary_key: pk.clone(),
                record: record.clone(),
            })
            .collect();
        Ok(Box::new(MemoryCursor::new(entries)))
    }

    async fn open_index_cursor(
        &self,
        index: &str,
        range: KeyRange,
    ) -> StoreResult<Box<dyn StoreCursor>> {
        let tree = self
            .shard
            .indices
            .get(index)
            .ok_or_else(|| StoreError::IndexNotFound(index.to_string()))?;

        if range.is_empty() {
            return Ok(Box::new(MemoryCursor::new(Vec::new())));
        }
        let mut entries = Vec::new();
        for (index_key, pks) in tree.range(range.bounds()) {
            for pk in pks {
                let record = self
                    .shard
                    .rows
                    .get(pk)
                    .cloned()
                    .ok_or_else(|| StoreError::Cursor(format!("dangling index entry: {}", pk)))?;
                entries.push(Entry {
                    key: index_key.clone(),
                    primary_key: pk.clone(),
                    record,
                });
            }
        }
        Ok(Box::new(MemoryCursor::new(entries)))
    }

    async fn read(&self, key: &Key) -> StoreResult<Option<Value>> {
        Ok(self.shard.rows.get(key).cloned())
    }

    async fn read_all(&self, keys: &[Key]) -> StoreResult<Vec<Option<Value>>> {
        try_join_all(keys.iter().map(|k| self.read(k))).await
    }

    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[derive(Debug)]
struct Entry {
    key: Key,
    primary_key: Key,
    record: Value,
}

/// A cursor over a pre-collected, ordered entry list.
#[derive(Debug)]
struct MemoryCursor {
    entries: Vec<Entry>,
    pos: usize,
}

impl MemoryCursor {
    fn new(entries: Vec<Entry>) -> Self {
        Self { entries, pos: 0 }
    }

    fn current(&self) -> Option<&Entry> {
        self.entries.get(self.pos)
    }
}

#[async_trait]
impl StoreCursor for MemoryCursor {
    fn done(&self) -> bool {
        self.pos >= self.entries.len()
    }

    fn current_key(&self) -> Option<&Key> {
        self.current().map(|e| &e.key)
    }

    fn current_primary_key(&self) -> Option<&Key> {
        self.current().map(|e| &e.primary_key)
    }

    fn current_value(&self) -> Option<&Value> {
        self.current().map(|e| &e.record)
    }

    async fn advance(&mut self) -> StoreResult<()> {
        if self.pos < self.entries.len() {
            self.pos += 1;
        }
        Ok(())
    }
}
