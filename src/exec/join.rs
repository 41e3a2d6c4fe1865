//! Merge-join coordination.
//!
//! All cursors iterate ascending by primary key; that precondition is
//! what makes the union's previous-key dedup guard and the
//! intersection's all-equal test correct. Each step consumes an
//! immutable snapshot of the live cursors' primary keys, produces a
//! decision (emit, advance set, or finish), applies the paging window
//! and advances. Emitted keys are strictly ascending and never repeat.

use tracing::debug;

use crate::cancel::CancelToken;
use crate::errors::{QueryError, QueryResult};
use crate::params::{Controls, JoinMode};
use crate::store::Key;

use super::driver::CursorDriver;

/// The `$from`/`$to`/`$limit` window applied while keys are emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultWindow {
    /// Skip matches up to and including this offset count.
    pub from: Option<u64>,
    /// Stop once the match counter passes this offset.
    pub to: Option<u64>,
    /// Hard cap on result length.
    pub limit: Option<u64>,
}

impl From<&Controls> for ResultWindow {
    fn from(controls: &Controls) -> Self {
        Self {
            from: controls.from,
            to: controls.to,
            limit: controls.limit,
        }
    }
}

/// What one coordinator step does.
#[derive(Debug, PartialEq)]
enum Decision {
    /// The join is exhausted.
    Finish,
    /// Optionally emit a key, then advance the given cursors.
    Step {
        emit: Option<Key>,
        advance: Vec<usize>,
    },
}

/// The merge-join coordinator.
pub struct MergeJoin {
    drivers: Vec<CursorDriver>,
    mode: JoinMode,
    window: ResultWindow,
}

impl MergeJoin {
    /// Builds a coordinator over opened, settled drivers.
    pub fn new(drivers: Vec<CursorDriver>, mode: JoinMode, window: ResultWindow) -> Self {
        Self {
            drivers,
            mode,
            window,
        }
    }

    /// Runs the join to completion or early termination.
    ///
    /// Cancellation is observed before every cursor advance. Cursors are
    /// released when the coordinator is dropped, on every exit path.
    pub async fn run(mut self, cancel: &CancelToken) -> QueryResult<Vec<Key>> {
        let mut emitted: Vec<Key> = Vec::new();
        if self.window.limit == Some(0) {
            return Ok(emitted);
        }

        let mut prev: Option<Key> = None;
        let mut seen: u64 = 0;

        loop {
            let snapshot = self.snapshot()?;
            match decide(self.mode, &snapshot) {
                Decision::Finish => break,
                Decision::Step { emit, advance } => {
                    if let Some(key) = emit {
                        if prev.as_ref() != Some(&key) {
                            seen += 1;
                            if self.window.from.map_or(true, |from| seen > from) {
                                emitted.push(key.clone());
                            }
                            let past_to = self.window.to.is_some_and(|to| seen > to);
                            let at_limit = self
                                .window
                                .limit
                                .is_some_and(|limit| emitted.len() as u64 == limit);
                            prev = Some(key);
                            if past_to || at_limit {
                                break;
                            }
                        }
                    }
                    for index in advance {
                        QueryError::guard(cancel)?;
                        self.drivers[index].advance().await?;
                    }
                }
            }
        }

        debug!(emitted = emitted.len(), seen, "merge join finished");
        Ok(emitted)
    }

    /// Current primary keys of all drivers; `None` marks a completed one.
    fn snapshot(&self) -> QueryResult<Vec<Option<Key>>> {
        self.drivers
            .iter()
            .map(|driver| {
                if driver.is_complete() {
                    Ok(None)
                } else {
                    driver
                        .primary_key()
                        .cloned()
                        .map(Some)
                        .ok_or_else(|| {
                            QueryError::Internal(format!(
                                "live cursor for '{}' reports no primary key",
                                driver.target()
                            ))
                        })
                }
            })
            .collect()
    }
}

/// Pure per-step decision over a snapshot of cursor positions.
fn decide(mode: JoinMode, keys: &[Option<Key>]) -> Decision {
    if keys.is_empty() {
        return Decision::Finish;
    }
    match mode {
        JoinMode::Or => {
            let lowest = match keys.iter().flatten().min() {
                Some(key) => key.clone(),
                None => return Decision::Finish,
            };
            // Advancing every cursor sitting on the match avoids
            // re-emitting it on the next step.
            let advance = keys
                .iter()
                .enumerate()
                .filter(|(_, key)| key.as_ref() == Some(&lowest))
                .map(|(index, _)| index)
                .collect();
            Decision::Step {
                emit: Some(lowest),
                advance,
            }
        }
        JoinMode::And => {
            // Any completed cursor empties the intersection.
            if keys.iter().any(|key| key.is_none()) {
                return Decision::Finish;
            }
            let first = keys[0].as_ref().cloned();
            if keys.iter().all(|key| key.as_ref() == first.as_ref()) {
                Decision::Step {
                    emit: first,
                    advance: (0..keys.len()).collect(),
                }
            } else {
                let lowest = keys
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| a.cmp(b))
                    .map(|(index, _)| index)
                    .unwrap_or(0);
                Decision::Step {
                    emit: None,
                    advance: vec![lowest],
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[Option<&str>]) -> Vec<Option<Key>> {
        items
            .iter()
            .map(|item| item.map(Key::from))
            .collect()
    }

    #[test]
    fn test_or_emits_lowest_and_advances_ties() {
        let decision = decide(JoinMode::Or, &keys(&[Some("b"), Some("a"), Some("a")]));
        assert_eq!(
            decision,
            Decision::Step {
                emit: Some(Key::from("a")),
                advance: vec![1, 2],
            }
        );
    }

    #[test]
    fn test_or_finishes_when_all_complete() {
        assert_eq!(decide(JoinMode::Or, &keys(&[None, None])), Decision::Finish);
    }

    #[test]
    fn test_or_ignores_completed_cursors() {
        let decision = decide(JoinMode::Or, &keys(&[None, Some("x")]));
        assert_eq!(
            decision,
            Decision::Step {
                emit: Some(Key::from("x")),
                advance: vec![1],
            }
        );
    }

    #[test]
    fn test_and_finishes_on_any_complete() {
        assert_eq!(
            decide(JoinMode::And, &keys(&[Some("a"), None])),
            Decision::Finish
        );
    }

    #[test]
    fn test_and_emits_when_all_equal() {
        let decision = decide(JoinMode::And, &keys(&[Some("k"), Some("k"), Some("k")]));
        assert_eq!(
            decision,
            Decision::Step {
                emit: Some(Key::from("k")),
                advance: vec![0, 1, 2],
            }
        );
    }

    #[test]
    fn test_and_advances_only_lowest_when_unequal() {
        let decision = decide(JoinMode::And, &keys(&[Some("c"), Some("a"), Some("b")]));
        assert_eq!(
            decision,
            Decision::Step {
                emit: None,
                advance: vec![1],
            }
        );
    }

    #[test]
    fn test_empty_snapshot_finishes() {
        assert_eq!(decide(JoinMode::And, &[]), Decision::Finish);
        assert_eq!(decide(JoinMode::Or, &[]), Decision::Finish);
    }
}
