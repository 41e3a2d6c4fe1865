//! Read-only store descriptors.
//!
//! A `Catalog` names the stores a deployment exposes; each `StoreSchema`
//! carries the primary-key path and the declared secondary indices. The
//! evaluator treats all of this as immutable input; schema definition and
//! index maintenance live elsewhere.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A declared secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDef {
    /// Index name, as addressed by query targets.
    pub name: String,
    /// Dotted path of the indexed value inside each record.
    pub key_path: String,
    /// Whether the index enforces one record per key.
    #[serde(default)]
    pub unique: bool,
}

/// Descriptor of one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSchema {
    /// Store name.
    pub name: String,
    /// Dotted path of the primary key inside each record.
    pub primary_key_path: String,
    /// Declared secondary indices.
    #[serde(default)]
    pub indices: Vec<IndexDef>,
}

impl StoreSchema {
    /// Creates a schema with no secondary indices.
    pub fn new(name: impl Into<String>, primary_key_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key_path: primary_key_path.into(),
            indices: Vec::new(),
        }
    }

    /// Adds a non-unique secondary index.
    pub fn with_index(mut self, name: impl Into<String>, key_path: impl Into<String>) -> Self {
        self.indices.push(IndexDef {
            name: name.into(),
            key_path: key_path.into(),
            unique: false,
        });
        self
    }

    /// Adds a unique secondary index.
    pub fn with_unique_index(
        mut self,
        name: impl Into<String>,
        key_path: impl Into<String>,
    ) -> Self {
        self.indices.push(IndexDef {
            name: name.into(),
            key_path: key_path.into(),
            unique: true,
        });
        self
    }

    /// Looks up a declared index by name.
    pub fn index(&self, name: &str) -> Option<&IndexDef> {
        self.indices.iter().find(|def| def.name == name)
    }
}

/// The set of stores visible to the evaluator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    stores: HashMap<String, StoreSchema>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a store schema, replacing any previous one of the same name.
    pub fn with_store(mut self, schema: StoreSchema) -> Self {
        self.stores.insert(schema.name.clone(), schema);
        self
    }

    /// Looks up a store by name.
    pub fn get(&self, name: &str) -> Option<&StoreSchema> {
        self.stores.get(name)
    }

    /// Whether the catalog names the store.
    pub fn contains(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    /// Iterates the registered schemas.
    pub fn iter(&self) -> impl Iterator<Item = &StoreSchema> {
        self.stores.values()
    }
}
