//! Run report data structures
//!
//! A [`RunReport`] is the JSON document written once per test run. The field
//! names follow the camelCase on-disk format so that reports written by other
//! reporters of the same format can be aggregated alongside ours.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub mod sanitize;
pub mod time;
pub mod writer;

pub use sanitize::{first_line, sanitize_error_message};
pub use writer::{report_file_name, write_json_atomic, write_run_report};

/// File name prefix shared by every run report.
pub const REPORT_FILE_PREFIX: &str = "test-report-";

/// Suite name used when a result carries none.
pub const DEFAULT_SUITE: &str = "Default Suite";

/// Outcome of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    /// Test passed.
    Passed,
    /// Test failed.
    Failed,
    /// Any other status another writer put in the file. Counted in totals only.
    #[serde(other)]
    Unknown,
}

impl TestStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, TestStatus::Failed)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Passed => write!(f, "PASSED"),
            TestStatus::Failed => write!(f, "FAILED"),
            TestStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A sanitized error attached to a failed test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestError {
    pub message: String,
    pub stack: String,
}

/// Result of a single executed test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Unique within a run; used for deduplication.
    #[serde(default)]
    pub uid: String,
    /// Time of day (`HH:MM:SS`, UTC) at which the result was recorded.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub suite_name: String,
    #[serde(default)]
    pub test_name: String,
    pub status: TestStatus,
    #[serde(default)]
    pub errors: Vec<TestError>,
    /// Path of the captured screenshot, empty when none was taken.
    #[serde(default)]
    pub screenshot: String,
    #[serde(default)]
    pub browser_console_logs: Vec<Value>,
    #[serde(default)]
    pub spec_console_logs: Vec<Value>,
}

impl TestResult {
    /// Create a passing result with no attachments.
    pub fn passed(
        uid: impl Into<String>,
        suite_name: impl Into<String>,
        test_name: impl Into<String>,
    ) -> Self {
        TestResult {
            uid: uid.into(),
            timestamp: String::new(),
            suite_name: suite_name.into(),
            test_name: test_name.into(),
            status: TestStatus::Passed,
            errors: Vec::new(),
            screenshot: String::new(),
            browser_console_logs: Vec::new(),
            spec_console_logs: Vec::new(),
        }
    }

    /// Create a failing result carrying one error message.
    pub fn failed(
        uid: impl Into<String>,
        suite_name: impl Into<String>,
        test_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        TestResult {
            status: TestStatus::Failed,
            errors: vec![TestError {
                stack: message.clone(),
                message,
            }],
            ..TestResult::passed(uid, suite_name, test_name)
        }
    }

    /// The suite this result is counted under when aggregating.
    pub fn suite_or_default(&self) -> &str {
        if self.suite_name.is_empty() {
            DEFAULT_SUITE
        } else {
            &self.suite_name
        }
    }
}

/// Metadata describing one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    /// Shared by every recorder taking part in the same test process.
    #[serde(default)]
    pub execution_id: String,
    #[serde(default)]
    pub browser_name: String,
    pub execution_start_time: String,
    pub execution_end_time: String,
    /// Elapsed minutes rendered with two decimals.
    #[serde(default)]
    pub total_time_in_minutes: String,
}

/// The JSON artifact produced by one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub test_results: Vec<TestResult>,
}

impl RunReport {
    pub fn count_passed(&self) -> usize {
        self.test_results
            .iter()
            .filter(|r| r.status == TestStatus::Passed)
            .count()
    }

    pub fn count_failed(&self) -> usize {
        self.test_results
            .iter()
            .filter(|r| r.status == TestStatus::Failed)
            .count()
    }

    pub fn total_tests(&self) -> usize {
        self.test_results.len()
    }
}
