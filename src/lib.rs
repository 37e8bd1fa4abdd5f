//! testreport - JSON reporting for browser test runs
//!
//! # Overview
//!
//! testreport turns the outcome of a test run into a JSON run report,
//! folds any number of run reports into one aggregated snapshot, and keeps a
//! short rolling history of snapshots so that defects which appear or go
//! away between runs can be spotted.
//!
//! # Architecture
//!
//! - [`recorder`]: collects per-test results during a run and writes the run report
//! - [`events`]: drives a recorder from a JSON-lines runner event stream
//! - [`report`]: run report data structures, timestamps and file output
//! - [`aggregate`]: reduces a directory of run reports into a snapshot
//! - [`history`]: defect diffing, retention and trends over snapshots
//! - [`commands`]: the user-facing commands (record, aggregate, history, trend)
//! - [`config`]: .testreport.conf configuration file parsing
//! - [`logging`]: tracing subscriber setup
//! - [`ui`]: user interface abstraction for output
//! - [`error`]: error types and Result alias
//!
//! # On-disk layout
//!
//! - `<output dir>/test-report-<timestamp>.json`: one file per recorder
//! - `<output dir>/screenshots/screenshot-<hash>-<timestamp>.png`
//! - the history log: a single JSON array, oldest record first
//!
//! # Example
//!
//! ```no_run
//! use testreport::aggregate::aggregate_reports;
//! use testreport::history::{FileHistoryStore, HistoryTracker};
//! use testreport::recorder::{ExecutionId, RecorderOptions, ResultRecorder, TestInfo};
//! use testreport::report::TestStatus;
//!
//! # fn main() -> testreport::error::Result<()> {
//! let options = RecorderOptions::new("reports", ExecutionId::generate());
//! let mut recorder = ResultRecorder::start(options);
//! recorder.record_outcome(&TestInfo::new("logs in").with_parent("Login"), TestStatus::Passed);
//! recorder.finish()?;
//!
//! let aggregation = aggregate_reports(&["reports"]);
//! let mut tracker = HistoryTracker::new(FileHistoryStore::new("reports/history.json"));
//! let update = tracker.update(&aggregation.snapshot);
//! println!("{} records kept", update.retained);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod logging;
pub mod recorder;
pub mod report;
pub mod ui;

pub use error::{Error, Result};
