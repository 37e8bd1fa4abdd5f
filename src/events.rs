//! Runner event streams
//!
//! Test runners report lifecycle events as JSON lines, one event per line:
//!
//! ```text
//! {"event": "runner-start", "browserName": "chrome"}
//! {"event": "test-start", "test": {"title": "logs in"}}
//! {"event": "stdout", "chunk": "navigating to /login"}
//! {"event": "browser-log", "entry": {"level": "SEVERE", "message": "404"}}
//! {"event": "test-fail", "test": {"uid": "0-0", "title": "logs in", "parent": "Login",
//!                                 "errors": [{"message": "timeout", "stack": "..."}]}}
//! {"event": "runner-end"}
//! ```
//!
//! [`replay`] feeds such a stream into a [`ResultRecorder`] and writes the
//! resulting report. Lines that do not parse are logged and skipped.

use crate::error::{Error, Result};
use crate::recorder::{BufferedLogProvider, ResultRecorder, TestInfo};
use crate::report::TestStatus;
use serde::Deserialize;
use serde_json::Value;
use std::io::BufRead;
use std::path::PathBuf;
use tracing::{debug, warn};

/// A single lifecycle event emitted by a test runner.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RunnerEvent {
    RunnerStart {
        #[serde(default, rename = "browserName")]
        browser_name: Option<String>,
    },
    TestStart {
        #[serde(default)]
        test: Option<TestInfo>,
    },
    Stdout {
        chunk: String,
    },
    BrowserLog {
        entry: Value,
    },
    TestPass {
        test: TestInfo,
    },
    TestFail {
        test: TestInfo,
    },
    RunnerEnd,
}

/// Parse one line of a runner event stream.
pub fn parse_event(line: &str) -> Result<RunnerEvent> {
    serde_json::from_str(line).map_err(|e| Error::Parse(format!("Invalid runner event: {}", e)))
}

/// What happened while replaying a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub skipped_lines: usize,
    pub recorded: usize,
    pub duplicates: usize,
    pub failed: usize,
    /// Whether the stream ended with an explicit `runner-end` event.
    pub ended: bool,
    pub report_path: PathBuf,
}

/// Replay a runner event stream into `recorder` and write its report.
///
/// `log_buffer`, when given, receives `browser-log` entries; it should be
/// the feeding side of the log provider installed on the recorder.
pub fn replay<R: BufRead>(
    reader: R,
    mut recorder: ResultRecorder,
    log_buffer: Option<&BufferedLogProvider>,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event = match parse_event(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = lineno + 1, error = %e, "Skipping malformed event");
                summary.skipped_lines += 1;
                continue;
            }
        };
        summary.events += 1;

        match event {
            RunnerEvent::RunnerStart { browser_name } => {
                if let Some(name) = browser_name {
                    recorder.set_browser_name(name);
                }
            }
            RunnerEvent::TestStart { .. } => recorder.on_test_start(),
            RunnerEvent::Stdout { chunk } => recorder.on_stdout(chunk),
            RunnerEvent::BrowserLog { entry } => match log_buffer {
                Some(buffer) => buffer.push(entry),
                None => debug!("Ignoring browser log entry, no log buffer attached"),
            },
            RunnerEvent::TestPass { test } => {
                record(&mut recorder, &test, TestStatus::Passed, &mut summary)
            }
            RunnerEvent::TestFail { test } => {
                record(&mut recorder, &test, TestStatus::Failed, &mut summary)
            }
            RunnerEvent::RunnerEnd => {
                summary.ended = true;
                break;
            }
        }
    }

    if !summary.ended {
        warn!("Event stream ended without runner-end, writing report anyway");
    }
    summary.report_path = recorder.finish()?;
    Ok(summary)
}

fn record(
    recorder: &mut ResultRecorder,
    test: &TestInfo,
    status: TestStatus,
    summary: &mut ReplaySummary,
) {
    if recorder.record_outcome(test, status) {
        summary.recorded += 1;
        if status.is_failure() {
            summary.failed += 1;
        }
    } else {
        summary.duplicates += 1;
    }
}
