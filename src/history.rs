//! Bounded, insertion-ordered error history.
//!
//! A plain bounded FIFO over a `VecDeque`: insertion beyond capacity evicts
//! the oldest record, purely by age. This is not an LRU - reads never affect
//! retention. A burst of one category can crowd out older records of other
//! categories; that trade-off is accepted in exchange for O(1) eviction and
//! zero background state.

use crate::config::CoordinatorConfig;
use crate::error::{ErrorCategory, ErrorRecord, ErrorSeverity};
use crate::logging::log_debug;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

/// Aggregate view over the retained history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorStatistics {
    /// Number of records currently retained.
    pub total_errors: usize,

    /// Retained record counts per category.
    pub by_category: BTreeMap<ErrorCategory, usize>,

    /// Retained record counts per severity.
    pub by_severity: BTreeMap<ErrorSeverity, usize>,

    /// Records whose timestamp falls within the configured recent window
    /// (one hour by default), oldest first.
    pub recent_errors: Vec<ErrorRecord>,
}

/// Capacity-bounded, insertion-ordered log of [`ErrorRecord`]s.
#[derive(Debug)]
pub struct HistoryStore {
    records: VecDeque<ErrorRecord>,
    capacity: usize,
    persistent_threshold: usize,
    recent_window: Duration,
}

impl Default for HistoryStore {
    fn default() -> Self {
        let config = CoordinatorConfig::default();
        Self::new(
            config.max_history_size,
            config.persistent_threshold,
            config.recent_window,
        )
    }
}

impl HistoryStore {
    /// Create a store retaining at most `capacity` records (minimum 1).
    pub fn new(capacity: usize, persistent_threshold: usize, recent_window: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
            persistent_threshold,
            recent_window,
        }
    }

    /// Append a record, evicting the oldest when at capacity.
    pub fn append(&mut self, record: ErrorRecord) {
        while self.records.len() >= self.capacity {
            if let Some(evicted) = self.records.pop_front() {
                log_debug!(
                    evicted_code = %evicted.code,
                    evicted_category = ?evicted.category,
                    capacity = self.capacity,
                    "History at capacity, evicting oldest record"
                );
            } else {
                break;
            }
        }
        self.records.push_back(record);
    }

    /// Iterate over retained records, oldest to newest.
    pub fn all(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all retained records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Compute aggregate statistics over the retained history.
    pub fn statistics(&self) -> ErrorStatistics {
        let mut by_category: BTreeMap<ErrorCategory, usize> = BTreeMap::new();
        let mut by_severity: BTreeMap<ErrorSeverity, usize> = BTreeMap::new();

        for record in &self.records {
            *by_category.entry(record.category).or_default() += 1;
            *by_severity.entry(record.severity).or_default() += 1;
        }

        let cutoff = window_cutoff(self.recent_window);
        let recent_errors = self
            .records
            .iter()
            .filter(|record| within_window(record, cutoff))
            .cloned()
            .collect();

        ErrorStatistics {
            total_errors: self.records.len(),
            by_category,
            by_severity,
            recent_errors,
        }
    }

    /// Whether `category` is failing persistently: more than the configured
    /// threshold of its records fall within the trailing `window`.
    ///
    /// Recomputed from the retained records on every call - no background
    /// timer and no side effects, so this is safe to call as often as needed.
    pub fn is_persistent_issue(&self, category: ErrorCategory, window: Duration) -> bool {
        let cutoff = window_cutoff(window);
        let count = self
            .records
            .iter()
            .filter(|record| record.category == category && within_window(record, cutoff))
            .count();

        count > self.persistent_threshold
    }
}

/// Start of the trailing window, or `None` when the window reaches past the
/// representable time range. Windows large enough to overflow simply cover
/// the whole history, so queries stay non-panicking for any caller input.
fn window_cutoff(window: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(window)
        .ok()
        .and_then(|delta| Utc::now().checked_sub_signed(delta))
}

fn within_window(record: &ErrorRecord, cutoff: Option<DateTime<Utc>>) -> bool {
    cutoff.map_or(true, |cutoff| record.timestamp >= cutoff)
}
