//! Rolling history of aggregated runs
//!
//! Each aggregation pass becomes one [`HistoryRecord`]. Before it is
//! appended, every suite is diffed against the same suite in the most recent
//! earlier record to find defects that appeared or went away. The log keeps
//! at most `max_history` records, oldest first.
//!
//! The log is handled as a value: it is loaded whole from a [`HistoryStore`],
//! a new log is computed, and the whole log is saved back.

use crate::aggregate::{AggregatedSnapshot, SuiteStats};
use crate::error::Result;
use crate::report::time::utc_string;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, info, warn};

pub mod file;
pub mod trend;

pub use file::FileHistoryStore;
pub use trend::{suite_trends, SuiteTrendPoint};

/// Number of records kept when nothing else is configured.
pub const DEFAULT_MAX_HISTORY: usize = 5;

/// Defects that changed relative to the previous record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefectComparison {
    /// Messages of errors present now but not in the previous record.
    pub new_defects: Vec<String>,
    /// Messages of errors present in the previous record but not now.
    pub resolved_defects: Vec<String>,
}

/// A suite's statistics within one history record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteRecord {
    #[serde(flatten)]
    pub stats: SuiteStats,
    #[serde(default)]
    pub defect_comparison: DefectComparison,
}

/// One retained point of the history log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryRecord {
    /// When this record was captured.
    pub timestamp: String,
    pub execution_start_time: Option<String>,
    pub execution_end_time: Option<String>,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub suites: BTreeMap<String, SuiteRecord>,
}

/// Storage for the history log.
pub trait HistoryStore {
    /// Load the whole log, oldest first. An absent log is empty.
    fn load(&self) -> Result<Vec<HistoryRecord>>;

    /// Replace the whole log.
    fn save(&mut self, records: &[HistoryRecord]) -> Result<()>;
}

/// A history store kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    pub records: Vec<HistoryRecord>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<HistoryRecord>) -> Self {
        MemoryHistoryStore { records }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Vec<HistoryRecord>> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[HistoryRecord]) -> Result<()> {
        self.records = records.to_vec();
        Ok(())
    }
}

/// Diff one suite's current errors against its previous record.
///
/// New defects carry the current messages; resolved defects carry the
/// messages stored in the previous record.
pub fn compare_defects(current: &SuiteStats, previous: Option<&SuiteRecord>) -> DefectComparison {
    let new_defects = current
        .errors
        .iter()
        .filter(|(key, _)| previous.map_or(true, |p| !p.stats.errors.contains_key(*key)))
        .map(|(_, message)| message.clone())
        .collect();

    let resolved_defects = previous
        .map(|p| {
            p.stats
                .errors
                .iter()
                .filter(|(key, _)| !current.errors.contains_key(*key))
                .map(|(_, message)| message.clone())
                .collect()
        })
        .unwrap_or_default();

    DefectComparison {
        new_defects,
        resolved_defects,
    }
}

/// Build the record for `snapshot`, diffing each of its suites against `previous`.
///
/// Suites that only exist in `previous` are not part of the new record.
pub fn build_record(
    snapshot: &AggregatedSnapshot,
    previous: Option<&HistoryRecord>,
    captured_at: DateTime<Utc>,
) -> HistoryRecord {
    let suites = snapshot
        .suites
        .iter()
        .map(|(name, stats)| {
            let prior = previous.and_then(|p| p.suites.get(name));
            let record = SuiteRecord {
                stats: stats.clone(),
                defect_comparison: compare_defects(stats, prior),
            };
            (name.clone(), record)
        })
        .collect();

    HistoryRecord {
        timestamp: utc_string(captured_at),
        execution_start_time: snapshot.execution_start_time.clone(),
        execution_end_time: snapshot.execution_end_time.clone(),
        total_tests: snapshot.total_tests,
        passed: snapshot.passed,
        failed: snapshot.failed,
        suites,
    }
}

/// Append `record` and drop the oldest records beyond `max_history`.
pub fn append_with_retention(
    mut log: Vec<HistoryRecord>,
    record: HistoryRecord,
    max_history: usize,
) -> Vec<HistoryRecord> {
    log.push(record);
    if log.len() > max_history {
        log.drain(..log.len() - max_history);
    }
    log
}

/// The outcome of [`HistoryTracker::update`].
#[derive(Debug, Clone)]
pub struct HistoryUpdate {
    /// The record that was appended.
    pub record: HistoryRecord,
    /// Length of the log after retention.
    pub retained: usize,
    /// Whether the new log reached storage. When false the record is still
    /// valid but will not be seen by later runs.
    pub persisted: bool,
}

/// Turns aggregated snapshots into history records.
pub struct HistoryTracker<S: HistoryStore> {
    store: S,
    max_history: usize,
}

impl<S: HistoryStore> HistoryTracker<S> {
    pub fn new(store: S) -> Self {
        HistoryTracker {
            store,
            max_history: DEFAULT_MAX_HISTORY,
        }
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The current log; unreadable storage yields an empty log.
    pub fn load(&self) -> Vec<HistoryRecord> {
        self.store.load().unwrap_or_else(|e| {
            warn!(error = %e, "Error reading history, starting a new one");
            Vec::new()
        })
    }

    /// Record `snapshot` now.
    pub fn update(&mut self, snapshot: &AggregatedSnapshot) -> HistoryUpdate {
        self.update_at(snapshot, Utc::now())
    }

    /// Record `snapshot` as captured at `captured_at`.
    ///
    /// Storage failures are logged and reported through
    /// [`HistoryUpdate::persisted`], never returned as errors.
    pub fn update_at(
        &mut self,
        snapshot: &AggregatedSnapshot,
        captured_at: DateTime<Utc>,
    ) -> HistoryUpdate {
        let log = self.load();
        let record = build_record(snapshot, log.last(), captured_at);
        let log = append_with_retention(log, record.clone(), self.max_history);

        let persisted = match self.store.save(&log) {
            Ok(()) => {
                info!(records = log.len(), "Aggregated history record appended");
                true
            }
            Err(e) => {
                error!(error = %e, "Error writing history");
                false
            }
        };

        HistoryUpdate {
            record,
            retained: log.len(),
            persisted,
        }
    }
}
