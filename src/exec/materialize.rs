//! Result materialization.
//!
//! Turns the coordinator's ordered key list into the requested output
//! shape. The keys format without `$orderBy` needs no reads at all;
//! every other shape reads each record through the store handle.

use serde_json::{Map, Value};

use crate::cancel::CancelToken;
use crate::errors::{QueryError, QueryResult};
use crate::params::{Controls, OutputFormat};
use crate::store::{Key, StoreHandle};

use super::sorter::compare_by_path;

/// A query's materialized result.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// Matching records, in join order unless `$orderBy` re-sorted them.
    Records(Vec<Value>),
    /// Primary keys only.
    Keys(Vec<Key>),
    /// Primary-key string form to record.
    Lookup(Map<String, Value>),
}

impl QueryOutput {
    /// The empty result of the given shape.
    pub fn empty(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Records => QueryOutput::Records(Vec::new()),
            OutputFormat::Keys => QueryOutput::Keys(Vec::new()),
            OutputFormat::Lookup => QueryOutput::Lookup(Map::new()),
        }
    }

    /// Number of entries in the result.
    pub fn len(&self) -> usize {
        match self {
            QueryOutput::Records(records) => records.len(),
            QueryOutput::Keys(keys) => keys.len(),
            QueryOutput::Lookup(map) => map.len(),
        }
    }

    /// Whether the result is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The wire shape: array of records, array of scalars, or object.
    pub fn into_json(self) -> Value {
        match self {
            QueryOutput::Records(records) => Value::Array(records),
            QueryOutput::Keys(keys) => {
                Value::Array(keys.iter().map(Key::to_json).collect())
            }
            QueryOutput::Lookup(map) => Value::Object(map),
        }
    }
}

/// Materializes an ordered key list into the requested shape.
pub async fn materialize<H>(
    handle: &H,
    keys: Vec<Key>,
    controls: &Controls,
    cancel: &CancelToken,
) -> QueryResult<QueryOutput>
where
    H: StoreHandle + ?Sized,
{
    if controls.format == OutputFormat::Keys && controls.order_by.is_none() {
        return Ok(QueryOutput::Keys(keys));
    }

    QueryError::guard(cancel)?;
    let records = handle.read_all(&keys).await?;
    let mut pairs: Vec<(Key, Value)> = Vec::with_capacity(keys.len());
    for (key, record) in keys.into_iter().zip(records) {
        let record = record.ok_or_else(|| {
            QueryError::Internal(format!("record vanished during materialization: {}", key))
        })?;
        pairs.push((key, record));
    }

    if let Some(path) = &controls.order_by {
        pairs.sort_by(|(_, a), (_, b)| compare_by_path(path, a, b));
    }

    Ok(match controls.format {
        OutputFormat::Keys => QueryOutput::Keys(pairs.into_iter().map(|(key, _)| key).collect()),
        OutputFormat::Records => {
            QueryOutput::Records(pairs.into_iter().map(|(_, record)| record).collect())
        }
        OutputFormat::Lookup => {
            let mut map = Map::new();
            for (key, record) in pairs {
                map.insert(key.string_form(), record);
            }
            QueryOutput::Lookup(map)
        }
    })
}
