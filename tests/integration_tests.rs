//! Integration tests for full workflows
//!
//! These tests exercise complete user workflows: recording runs into a
//! report directory, aggregating them and tracking the result over time.

use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use testreport::aggregate::{aggregate_reports, error_key};
use testreport::commands::{AggregateCommand, Command, HistoryCommand, RecordCommand, TrendCommand};
use testreport::history::{FileHistoryStore, HistoryStore, HistoryTracker};
use testreport::recorder::{ExecutionId, RawError, RecorderOptions, ResultRecorder, TestInfo};
use testreport::report::{TestStatus, DEFAULT_SUITE};
use testreport::ui::UI;

/// Simple test UI that captures output for assertions
struct TestUI {
    output: Vec<String>,
    errors: Vec<String>,
}

impl TestUI {
    fn new() -> Self {
        TestUI {
            output: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }
}

impl UI for TestUI {
    fn output(&mut self, message: &str) -> testreport::error::Result<()> {
        self.output.push(message.to_string());
        Ok(())
    }

    fn error(&mut self, message: &str) -> testreport::error::Result<()> {
        self.errors.push(message.to_string());
        Ok(())
    }

    fn warning(&mut self, message: &str) -> testreport::error::Result<()> {
        self.errors.push(format!("Warning: {}", message));
        Ok(())
    }
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 8, hour, minute, 0).unwrap()
}

fn record_run(
    dir: &Path,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    outcomes: &[(&str, &str, Option<&str>)],
) -> PathBuf {
    let options = RecorderOptions::new(dir, ExecutionId::new("exec-1"));
    let mut recorder = ResultRecorder::start_at(options, start);
    for (suite, title, failure) in outcomes {
        let mut test = TestInfo::new(*title)
            .with_uid(format!("{}-{}", suite, title))
            .with_parent(*suite);
        let status = match failure {
            Some(message) => {
                test = test.with_error(RawError::new(*message));
                TestStatus::Failed
            }
            None => TestStatus::Passed,
        };
        recorder.record_outcome_at(&test, status, start);
    }
    recorder.finish_at(end).unwrap()
}

#[test]
fn test_two_recorders_aggregate_into_one_snapshot() {
    let temp = TempDir::new().unwrap();
    let reports = temp.path().join("reports");

    let first = record_run(
        &reports,
        at(10, 0),
        at(10, 5),
        &[("suite1 Login", "opens", None), ("suite1 Login", "submits", Some("timeout"))],
    );
    let second = record_run(
        &reports,
        at(9, 30),
        at(10, 5),
        &[("Cart", "adds", None)],
    );
    assert_ne!(first, second);
    assert!(second.to_string_lossy().ends_with("-1.json"));

    let aggregation = aggregate_reports(&[&reports]);
    let snapshot = &aggregation.snapshot;

    assert_eq!(aggregation.files_read.len(), 2);
    assert_eq!(snapshot.total_tests, 3);
    assert_eq!(snapshot.passed, 2);
    assert_eq!(snapshot.failed, 1);
    assert_eq!(
        snapshot.execution_start_time.as_deref(),
        Some("Tue, 08 Apr 2025 09:30:00 GMT")
    );
    assert_eq!(
        snapshot.execution_end_time.as_deref(),
        Some("Tue, 08 Apr 2025 10:05:00 GMT")
    );
    assert_eq!(snapshot.suites["Login"].failed, 1);
    assert_eq!(
        snapshot.suites["Login"].errors[&error_key("submits", "timeout")],
        "timeout"
    );
    assert_eq!(snapshot.suites["Cart"].passed, 1);
    assert!(!snapshot.suites.contains_key(DEFAULT_SUITE));
}

#[test]
fn test_corrupt_report_does_not_poison_aggregation() {
    let temp = TempDir::new().unwrap();
    let reports = temp.path().join("reports");
    record_run(&reports, at(10, 0), at(10, 1), &[("S", "a", None)]);
    fs::write(reports.join("test-report-zzz.json"), "{\"metadata\": 4").unwrap();
    fs::write(reports.join("notes.json"), "not a report").unwrap();

    let aggregation = aggregate_reports(&[&reports]);

    assert_eq!(aggregation.files_read.len(), 1);
    assert_eq!(aggregation.files_skipped.len(), 1);
    assert_eq!(aggregation.snapshot.total_tests, 1);
}

#[test]
fn test_same_error_key_across_files_keeps_last_message() {
    let temp = TempDir::new().unwrap();
    let reports = temp.path().join("reports");
    record_run(&reports, at(10, 0), at(10, 1), &[("S", "t", Some("boom"))]);
    record_run(&reports, at(11, 0), at(11, 1), &[("S", "t", Some("boom"))]);

    let snapshot = aggregate_reports(&[&reports]).snapshot;

    assert_eq!(snapshot.suites["S"].failed, 2);
    assert_eq!(snapshot.suites["S"].errors.len(), 1);
}

#[test]
fn test_history_retention_over_many_runs() {
    let temp = TempDir::new().unwrap();
    let reports = temp.path().join("reports");
    let history = temp.path().join("history.json");
    record_run(&reports, at(10, 0), at(10, 1), &[("S", "t", None)]);

    let snapshot = aggregate_reports(&[&reports]).snapshot;
    let mut tracker = HistoryTracker::new(FileHistoryStore::new(&history));
    for minute in 0..7 {
        let update = tracker.update_at(&snapshot, at(12, minute));
        assert!(update.persisted);
        assert!(update.retained <= 5);
    }

    let log = FileHistoryStore::new(&history).load().unwrap();
    assert_eq!(log.len(), 5);
    assert_eq!(log[0].timestamp, "Tue, 08 Apr 2025 12:02:00 GMT");
    assert_eq!(log[4].timestamp, "Tue, 08 Apr 2025 12:06:00 GMT");
}

#[test]
fn test_full_workflow_record_aggregate_history_trend() {
    let temp = TempDir::new().unwrap();
    let base_path = temp.path().to_string_lossy().to_string();
    fs::write(
        temp.path().join(".testreport.conf"),
        "[DEFAULT]\noutput_file=reports/test-report.json\nhistory_path=reports/history.json\n",
    )
    .unwrap();

    // Step 1: Record a run with a failure
    let events = temp.path().join("run1.jsonl");
    fs::write(
        &events,
        concat!(
            r#"{"event": "runner-start", "browserName": "firefox"}"#,
            "\n",
            r#"{"event": "test-start"}"#,
            "\n",
            r#"{"event": "stdout", "chunk": "clicking"}"#,
            "\n",
            r#"{"event": "test-fail", "test": {"uid": "1", "title": "submits", "parent": "Login", "errors": [{"message": "\u001b[31mtimeout\u001b[39m"}]}}"#,
            "\n",
            r#"{"event": "test-pass", "test": {"uid": "2", "title": "opens", "parent": "Login"}}"#,
            "\n",
            r#"{"event": "runner-end"}"#,
            "\n"
        ),
    )
    .unwrap();
    let mut ui = TestUI::new();
    let cmd = RecordCommand::new(Some(base_path.clone())).with_input(Some(events));
    assert_eq!(cmd.execute(&mut ui).unwrap(), 1);
    assert!(ui.printed("Recorded 2 test result(s)"));

    // Step 2: Aggregate
    let mut ui = TestUI::new();
    let cmd = AggregateCommand::new(Some(base_path.clone()), vec![]);
    assert_eq!(cmd.execute(&mut ui).unwrap(), 1);
    assert!(ui.printed("Login: 2 tests, 1 passed, 1 failed"));
    assert!(ui.printed("1x timeout"));

    // Step 3: First history record marks the failure as new
    let mut ui = TestUI::new();
    let cmd = HistoryCommand::new(Some(base_path.clone()), vec![]);
    assert_eq!(cmd.execute(&mut ui).unwrap(), 0);
    assert!(ui.printed("Login: 1 new, 0 resolved"));

    // Step 4: Trend shows the suite
    let mut ui = TestUI::new();
    let cmd = TrendCommand::new(Some(base_path.clone()));
    assert_eq!(cmd.execute(&mut ui).unwrap(), 0);
    assert_eq!(ui.output[0], "Login:");
    assert!(ui.output[1].contains("1/2 passed (50.00%)  +1 new"));

    let log = FileHistoryStore::new(temp.path().join("reports/history.json"))
        .load()
        .unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(
        log[0].suites["Login"].defect_comparison.new_defects,
        vec!["timeout"]
    );
}
