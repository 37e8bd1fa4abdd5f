//! Folding many run reports into one aggregated snapshot
//!
//! Every `test-report-*.json` file found in the input directories contributes
//! to a single [`AggregatedSnapshot`]:
//!
//! - start/end times are reduced globally to the earliest start and latest end
//! - test counts are summed per file, without deduplicating uids across files
//! - results are bucketed per suite, and each failure's errors are keyed by
//!   `testName + "-" + message` so a recurring failure collapses to one entry
//!
//! A directory that does not exist or a file that does not parse is logged
//! and skipped; it never aborts the aggregation of the remaining files.

use crate::error::{Error, Result};
use crate::report::time::parse_report_time;
use crate::report::{RunMetadata, RunReport, TestResult, TestStatus, REPORT_FILE_PREFIX};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key identifying one defect within a suite.
pub fn error_key(test_name: &str, message: &str) -> String {
    format!("{}-{}", test_name, message)
}

/// Per-suite counts and distinct errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuiteStats {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    /// Error key to raw error message.
    pub errors: BTreeMap<String, String>,
}

impl SuiteStats {
    fn add(&mut self, result: &TestResult) {
        self.total_tests += 1;
        match result.status {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => {
                self.failed += 1;
                for error in &result.errors {
                    self.errors
                        .insert(error_key(&result.test_name, &error.message), error.message.clone());
                }
            }
            TestStatus::Unknown => {}
        }
    }
}

/// Combined view of every run report found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregatedSnapshot {
    /// Earliest start across all reports, as written in that report.
    pub execution_start_time: Option<String>,
    /// Latest end across all reports, as written in that report.
    pub execution_end_time: Option<String>,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub suites: BTreeMap<String, SuiteStats>,
}

/// Output of an aggregation pass.
///
/// Besides the snapshot, the raw results and per-file metadata are passed
/// through untouched for presentation purposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub snapshot: AggregatedSnapshot,
    pub test_results: Vec<TestResult>,
    pub metadata: Vec<RunMetadata>,
    #[serde(skip)]
    pub files_read: Vec<PathBuf>,
    #[serde(skip)]
    pub files_skipped: Vec<PathBuf>,
}

impl Aggregation {
    /// Each distinct error message with its number of occurrences, in order
    /// of first appearance.
    pub fn unique_errors(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for error in self.test_results.iter().flat_map(|r| r.errors.iter()) {
            match index.get(error.message.as_str()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(&error.message, counts.len());
                    counts.push((error.message.clone(), 1));
                }
            }
        }
        counts
    }
}

/// Incrementally folds run reports into an [`Aggregation`].
#[derive(Debug, Default)]
pub struct Aggregator {
    aggregation: Aggregation,
    earliest_start: Option<DateTime<Utc>>,
    latest_end: Option<DateTime<Utc>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one parsed report in.
    pub fn add_report(&mut self, report: RunReport) {
        let meta = &report.metadata;
        let snapshot = &mut self.aggregation.snapshot;

        match parse_report_time(&meta.execution_start_time) {
            Some(start) if self.earliest_start.map_or(true, |s| start < s) => {
                self.earliest_start = Some(start);
                snapshot.execution_start_time = Some(meta.execution_start_time.clone());
            }
            Some(_) => {}
            None => warn!(
                value = %meta.execution_start_time,
                "Ignoring unparseable executionStartTime"
            ),
        }
        match parse_report_time(&meta.execution_end_time) {
            Some(end) if self.latest_end.map_or(true, |e| end > e) => {
                self.latest_end = Some(end);
                snapshot.execution_end_time = Some(meta.execution_end_time.clone());
            }
            Some(_) => {}
            None => warn!(
                value = %meta.execution_end_time,
                "Ignoring unparseable executionEndTime"
            ),
        }

        snapshot.total_tests += report.total_tests();
        snapshot.passed += report.count_passed();
        snapshot.failed += report.count_failed();

        for result in &report.test_results {
            snapshot
                .suites
                .entry(result.suite_or_default().to_string())
                .or_default()
                .add(result);
        }

        self.aggregation.metadata.push(report.metadata);
        self.aggregation.test_results.extend(report.test_results);
    }

    /// Read, parse and fold one report file.
    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let report = read_run_report(path)?;
        self.add_report(report);
        self.aggregation.files_read.push(path.to_path_buf());
        Ok(())
    }

    /// Fold every report file in `dir`, skipping files that fail to load.
    ///
    /// A missing directory contributes nothing. Returns the number of files
    /// that were folded in.
    pub fn add_directory(&mut self, dir: &Path) -> usize {
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "Report directory not found");
            return 0;
        }

        let files = match list_report_files(dir) {
            Ok(files) => files,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Could not list report directory");
                return 0;
            }
        };

        let mut added = 0;
        for file in files {
            match self.add_file(&file) {
                Ok(()) => added += 1,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Error processing report file");
                    self.aggregation.files_skipped.push(file);
                }
            }
        }
        debug!(dir = %dir.display(), files = added, "Aggregated report directory");
        added
    }

    pub fn finish(self) -> Aggregation {
        self.aggregation
    }
}

/// List `test-report-*.json` files in `dir`, sorted by file name.
pub fn list_report_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(REPORT_FILE_PREFIX)
            && name.ends_with(".json")
            && entry.file_type()?.is_file()
        {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Load a single run report.
pub fn read_run_report(path: &Path) -> Result<RunReport> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| Error::InvalidReport {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Aggregate every report found in `dirs`.
pub fn aggregate_reports<P: AsRef<Path>>(dirs: &[P]) -> Aggregation {
    let mut aggregator = Aggregator::new();
    for dir in dirs {
        aggregator.add_directory(dir.as_ref());
    }
    aggregator.finish()
}
