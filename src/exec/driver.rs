//! Cursor drivers.
//!
//! A driver turns a raw store cursor into a uniform primary-key stream:
//! prefix cursors complete themselves once the cursor key leaves the
//! prefix, and scan cursors skip rows whose resolved value fails the
//! predicate. After `open` or `advance` a driver is either complete or
//! positioned on a row it is willing to surface.

use crate::errors::{QueryError, QueryResult};
use crate::params::PredicateOp;
use crate::path::Path;
use crate::plan::{CursorPlan, Strategy};
use crate::store::{Key, KeyRange, StoreCursor, StoreHandle};

enum DriverFilter {
    Direct,
    Prefix(String),
    Scan { path: Path, op: PredicateOp },
}

/// One predicate's cursor, advanced by the merge coordinator.
pub struct CursorDriver {
    target: String,
    cursor: Box<dyn StoreCursor>,
    filter: DriverFilter,
    complete: bool,
}

impl CursorDriver {
    /// Opens the cursor a plan calls for and settles it on its first row.
    pub async fn open<H>(handle: &H, plan: &CursorPlan) -> QueryResult<Self>
    where
        H: StoreHandle + ?Sized,
    {
        let (cursor, filter) = match &plan.strategy {
            Strategy::Primary { range, prefix } => {
                let cursor = handle.open_primary_cursor(range.clone()).await?;
                (cursor, filter_for(prefix))
            }
            Strategy::Index {
                index,
                range,
                prefix,
            } => {
                let cursor = handle.open_index_cursor(index, range.clone()).await?;
                (cursor, filter_for(prefix))
            }
            Strategy::Scan { path, op } => {
                let cursor = handle.open_primary_cursor(KeyRange::Unbounded).await?;
                (
                    cursor,
                    DriverFilter::Scan {
                        path: path.clone(),
                        op: op.clone(),
                    },
                )
            }
        };

        let mut driver = Self {
            target: plan.target.clone(),
            cursor,
            filter,
            complete: false,
        };
        driver.settle().await?;
        Ok(driver)
    }

    /// The parameter target this driver serves.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether the driver has no more rows to surface.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The primary key of the current row; `None` once complete.
    pub fn primary_key(&self) -> Option<&Key> {
        if self.complete {
            None
        } else {
            self.cursor.current_primary_key()
        }
    }

    /// Moves past the current row and settles on the next surfaced one.
    pub async fn advance(&mut self) -> QueryResult<()> {
        if self.complete {
            return Ok(());
        }
        self.cursor.advance().await?;
        self.settle().await
    }

    /// Establishes the driver invariant: complete, or positioned on a row
    /// that passes the filter.
    async fn settle(&mut self) -> QueryResult<()> {
        loop {
            if self.cursor.done() {
                self.complete = true;
                return Ok(());
            }
            match &self.filter {
                DriverFilter::Direct => return Ok(()),
                DriverFilter::Prefix(prefix) => {
                    let key = self.current_cursor_key()?;
                    if key.string_form().starts_with(prefix.as_str()) {
                        return Ok(());
                    }
                    // Cursor keys ascend, so the prefix region is behind us.
                    self.complete = true;
                    return Ok(());
                }
                DriverFilter::Scan { path, op } => {
                    let record = self.cursor.current_value().ok_or_else(|| {
                        QueryError::Internal(format!(
                            "scan cursor for '{}' reports no record",
                            self.target
                        ))
                    })?;
                    if op.matches(path.resolve(record)) {
                        return Ok(());
                    }
                    self.cursor.advance().await?;
                }
            }
        }
    }

    fn current_cursor_key(&self) -> QueryResult<&Key> {
        self.cursor.current_key().ok_or_else(|| {
            QueryError::Internal(format!("cursor for '{}' reports no key", self.target))
        })
    }
}

fn filter_for(prefix: &Option<String>) -> DriverFilter {
    match prefix {
        Some(p) => DriverFilter::Prefix(p.clone()),
        None => DriverFilter::Direct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Predicate;
    use crate::plan::classify;
    use crate::schema::StoreSchema;
    use crate::store::{MemoryStore, StoreProvider};
    use serde_json::json;

    async fn open_driver(predicate: Predicate) -> CursorDriver {
        let schema = StoreSchema::new("files", "pk").with_index("group", "group");
        let mut store = MemoryStore::new();
        store.create_store(schema.clone());
        for (pk, group, title) in [
            ("a", "aaa", "a"),
            ("aa", "aaa", "aa"),
            ("aaa", "aaa", "aaa"),
            ("bbb", "bbb", "bbb"),
            ("ccc", "bbb", "ccc"),
        ] {
            store
                .insert(
                    "files",
                    json!({"pk": pk, "group": group, "value": {"title": title}}),
                )
                .unwrap();
        }
        let handle = store.open("files").await.unwrap();
        let plan = classify(&schema, &[predicate]);
        CursorDriver::open(&handle, &plan.cursors[0]).await.unwrap()
    }

    async fn drain(mut driver: CursorDriver) -> Vec<String> {
        let mut keys = Vec::new();
        while !driver.is_complete() {
            keys.push(driver.primary_key().unwrap().string_form());
            driver.advance().await.unwrap();
        }
        keys
    }

    #[tokio::test]
    async fn test_primary_equality() {
        let driver = open_driver(Predicate::eq("pk", "aaa")).await;
        assert_eq!(drain(driver).await, vec!["aaa"]);
    }

    #[tokio::test]
    async fn test_primary_prefix_stops_at_boundary() {
        let driver = open_driver(Predicate::prefix("pk", "a")).await;
        assert_eq!(drain(driver).await, vec!["a", "aa", "aaa"]);
    }

    #[tokio::test]
    async fn test_index_prefix_surfaces_primary_keys() {
        let driver = open_driver(Predicate::prefix("group", "aa")).await;
        assert_eq!(drain(driver).await, vec!["a", "aa", "aaa"]);
    }

    #[tokio::test]
    async fn test_scan_skips_non_matching_rows() {
        let driver = open_driver(Predicate::prefix("value.title", "aa")).await;
        assert_eq!(drain(driver).await, vec!["aa", "aaa"]);
    }

    #[tokio::test]
    async fn test_scan_equality() {
        let driver = open_driver(Predicate::eq("value.title", "aaa")).await;
        assert_eq!(drain(driver).await, vec!["aaa"]);
    }

    #[tokio::test]
    async fn test_no_match_is_complete_immediately() {
        let driver = open_driver(Predicate::eq("pk", "zzz")).await;
        assert!(driver.is_complete());
        assert_eq!(driver.primary_key(), None);
    }

    #[tokio::test]
    async fn test_advance_after_complete_is_noop() {
        let mut driver = open_driver(Predicate::eq("pk", "zzz")).await;
        driver.advance().await.unwrap();
        assert!(driver.is_complete());
    }
}
