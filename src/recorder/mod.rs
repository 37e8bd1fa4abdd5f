//! Recording the results of a single test run
//!
//! A [`ResultRecorder`] is created when a run starts, receives one call per
//! finished test and writes exactly one [`RunReport`] when the run ends.
//!
//! Results are deduplicated by `uid`: the first result recorded for a uid
//! wins and later ones are dropped silently.

use crate::error::{Error, Result};
use crate::report::time::{elapsed_minutes, filename_timestamp, time_of_day, utc_string};
use crate::report::{
    sanitize_error_message, write_run_report, RunMetadata, RunReport, TestError, TestResult,
    TestStatus, DEFAULT_SUITE,
};
use base64::Engine;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, error, info, warn};

pub mod capture;

pub use capture::{BufferedLogProvider, CommandScreenshotProvider, LogProvider, ScreenshotProvider};

static SUITE_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)suite\d+").expect("valid regex"));

/// When screenshots are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenshotOption {
    /// Never.
    #[default]
    No,
    /// Only for failed tests.
    OnFailure,
    /// For every test.
    Full,
}

impl ScreenshotOption {
    /// Whether a test finishing with `status` should be photographed.
    pub fn wants(&self, status: TestStatus) -> bool {
        match self {
            ScreenshotOption::No => false,
            ScreenshotOption::OnFailure => status.is_failure(),
            ScreenshotOption::Full => true,
        }
    }
}

impl FromStr for ScreenshotOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no" | "off" | "none" => Ok(ScreenshotOption::No),
            "onfailure" | "on-failure" | "on_failure" => Ok(ScreenshotOption::OnFailure),
            "full" | "always" => Ok(ScreenshotOption::Full),
            other => Err(Error::Config(format!(
                "Unknown screenshot option '{}' (expected No, OnFailure or Full)",
                other
            ))),
        }
    }
}

impl fmt::Display for ScreenshotOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenshotOption::No => write!(f, "No"),
            ScreenshotOption::OnFailure => write!(f, "OnFailure"),
            ScreenshotOption::Full => write!(f, "Full"),
        }
    }
}

/// Identity shared by every recorder taking part in one test execution.
///
/// It is minted once by whoever starts the execution and handed to each
/// recorder, rather than discovered through process-global state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecutionId(String);

impl ExecutionId {
    pub fn new(id: impl Into<String>) -> Self {
        ExecutionId(id.into())
    }

    /// Mint an id from the current time in milliseconds.
    pub fn generate() -> Self {
        ExecutionId(Utc::now().timestamp_millis().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An error as reported by the test runner, before sanitizing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawError {
    pub message: Option<String>,
    pub stack: Option<String>,
}

impl RawError {
    pub fn new(message: impl Into<String>) -> Self {
        RawError {
            message: Some(message.into()),
            stack: None,
        }
    }
}

/// What the recorder needs to know about a finished test.
///
/// Test runner adapters map their own test objects onto this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TestInfo {
    pub uid: Option<String>,
    pub title: String,
    /// Name of the enclosing suite or describe block.
    pub parent: Option<String>,
    pub errors: Vec<RawError>,
}

impl TestInfo {
    pub fn new(title: impl Into<String>) -> Self {
        TestInfo {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_error(mut self, error: RawError) -> Self {
        self.errors.push(error);
        self
    }
}

/// Derive the suite name from a test's parent, dropping `suiteN` index artifacts.
pub fn derive_suite_name(parent: Option<&str>) -> String {
    match parent {
        Some(parent) if !parent.is_empty() => {
            SUITE_INDEX.replace_all(parent, "").trim().to_string()
        }
        _ => DEFAULT_SUITE.to_string(),
    }
}

/// Short, non-cryptographic hash of a string as 8 hex digits.
///
/// This is the classic 31-multiplier string hash over UTF-16 code units,
/// kept compatible with screenshots named by other reporters of this format.
pub fn short_hash(input: &str) -> String {
    if input.is_empty() {
        return "00000000".to_string();
    }
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit));
    }
    let hex = format!("{:08x}", i64::from(hash).abs());
    hex[..8].to_string()
}

/// Options for a recorder.
#[derive(Debug, Clone)]
pub struct RecorderOptions {
    /// Directory the run report (and screenshots) are written to.
    pub output_dir: PathBuf,
    pub screenshot_option: ScreenshotOption,
    pub execution_id: ExecutionId,
    pub browser_name: String,
}

impl RecorderOptions {
    pub fn new(output_dir: impl Into<PathBuf>, execution_id: ExecutionId) -> Self {
        RecorderOptions {
            output_dir: output_dir.into(),
            screenshot_option: ScreenshotOption::No,
            execution_id,
            browser_name: "Unknown".to_string(),
        }
    }
}

/// Accumulates the results of one run.
pub struct ResultRecorder {
    options: RecorderOptions,
    results: Vec<TestResult>,
    seen_uids: HashSet<String>,
    started_at: DateTime<Utc>,
    spec_logs: Vec<Value>,
    screenshots: Option<Box<dyn ScreenshotProvider>>,
    logs: Option<Box<dyn LogProvider>>,
}

impl ResultRecorder {
    /// Start recording a run now.
    pub fn start(options: RecorderOptions) -> Self {
        Self::start_at(options, Utc::now())
    }

    /// Start recording a run that began at `started_at`.
    pub fn start_at(options: RecorderOptions, started_at: DateTime<Utc>) -> Self {
        if let Err(e) = fs::create_dir_all(&options.output_dir) {
            warn!(
                dir = %options.output_dir.display(),
                error = %e,
                "Could not create report directory yet"
            );
        }
        debug!(execution_id = %options.execution_id, "Recorder started");

        ResultRecorder {
            options,
            results: Vec::new(),
            seen_uids: HashSet::new(),
            started_at,
            spec_logs: Vec::new(),
            screenshots: None,
            logs: None,
        }
    }

    pub fn with_screenshot_provider(mut self, provider: Box<dyn ScreenshotProvider>) -> Self {
        self.screenshots = Some(provider);
        self
    }

    pub fn with_log_provider(mut self, provider: Box<dyn LogProvider>) -> Self {
        self.logs = Some(provider);
        self
    }

    pub fn execution_id(&self) -> &ExecutionId {
        &self.options.execution_id
    }

    pub fn set_browser_name(&mut self, name: impl Into<String>) {
        self.options.browser_name = name.into();
    }

    /// Results recorded so far, in recording order.
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// A test started: console output from now on belongs to it.
    pub fn on_test_start(&mut self) {
        self.spec_logs.clear();
    }

    /// Console output produced by the spec while a test runs.
    pub fn on_stdout(&mut self, chunk: impl Into<String>) {
        self.spec_logs.push(Value::String(chunk.into()));
    }

    /// Record the outcome of a test.
    ///
    /// Returns `false` when a result with the same uid was already recorded,
    /// in which case nothing changes.
    pub fn record_outcome(&mut self, test: &TestInfo, status: TestStatus) -> bool {
        self.record_outcome_at(test, status, Utc::now())
    }

    /// Like [`record_outcome`](Self::record_outcome) with an explicit clock reading.
    pub fn record_outcome_at(
        &mut self,
        test: &TestInfo,
        status: TestStatus,
        now: DateTime<Utc>,
    ) -> bool {
        let timestamp = time_of_day(now);
        let uid = match &test.uid {
            Some(uid) if !uid.is_empty() => uid.clone(),
            _ => format!("{}-{}", test.title, timestamp),
        };
        // Output captured during this attempt belongs to it whether or not it is kept.
        let spec_logs = std::mem::take(&mut self.spec_logs);
        let browser_console_logs = self.capture_browser_logs();

        if self.seen_uids.contains(&uid) {
            debug!(uid = %uid, "Dropping duplicate result");
            return false;
        }

        let errors = test
            .errors
            .iter()
            .map(|e| TestError {
                message: sanitize_error_message(e.message.as_deref()),
                stack: sanitize_error_message(e.stack.as_deref()),
            })
            .collect();

        let screenshot = if self.options.screenshot_option.wants(status) {
            self.capture_screenshot(&test.title, now)
        } else {
            String::new()
        };

        self.seen_uids.insert(uid.clone());
        self.results.push(TestResult {
            uid,
            timestamp,
            suite_name: derive_suite_name(test.parent.as_deref()),
            test_name: test.title.clone(),
            status,
            errors,
            screenshot,
            browser_console_logs,
            spec_console_logs: spec_logs,
        });
        true
    }

    fn capture_screenshot(&mut self, title: &str, now: DateTime<Utc>) -> String {
        let Some(provider) = self.screenshots.as_mut() else {
            return String::new();
        };
        let dir = self.options.output_dir.join("screenshots");

        match provider
            .take_screenshot()
            .and_then(|data| save_screenshot(&dir, title, now, &data))
        {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(e) => {
                warn!(test = %title, error = %e, "Error capturing screenshot");
                String::new()
            }
        }
    }

    fn capture_browser_logs(&mut self) -> Vec<Value> {
        let Some(provider) = self.logs.as_mut() else {
            return Vec::new();
        };
        provider.fetch_logs().unwrap_or_else(|e| {
            warn!(error = %e, "Browser logs not available");
            Vec::new()
        })
    }

    /// Assemble the report for a run ending at `ended_at`.
    pub fn report(&self, ended_at: DateTime<Utc>) -> RunReport {
        RunReport {
            metadata: RunMetadata {
                execution_id: self.options.execution_id.to_string(),
                browser_name: self.options.browser_name.clone(),
                execution_start_time: utc_string(self.started_at),
                execution_end_time: utc_string(ended_at),
                total_time_in_minutes: elapsed_minutes(self.started_at, ended_at),
            },
            test_results: self.results.clone(),
        }
    }

    /// End the run and write its report, returning the file written.
    pub fn finish(self) -> Result<PathBuf> {
        self.finish_at(Utc::now())
    }

    pub fn finish_at(self, ended_at: DateTime<Utc>) -> Result<PathBuf> {
        let report = self.report(ended_at);
        match write_run_report(&self.options.output_dir, &report, ended_at) {
            Ok(path) => {
                info!(
                    path = %path.display(),
                    tests = report.total_tests(),
                    "JSON report written"
                );
                Ok(path)
            }
            Err(e) => {
                error!(
                    dir = %self.options.output_dir.display(),
                    error = %e,
                    "Failed to write JSON report"
                );
                Err(e)
            }
        }
    }
}

fn save_screenshot(dir: &Path, title: &str, now: DateTime<Utc>, data: &str) -> Result<PathBuf> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| Error::Capture(format!("Screenshot is not valid base64: {}", e)))?;

    fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "screenshot-{}-{}.png",
        short_hash(title),
        filename_timestamp(now)
    ));
    fs::write(&path, bytes)?;
    Ok(path)
}
