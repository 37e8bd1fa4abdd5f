//! Writing report documents to disk
//!
//! Documents are serialized into a temporary file next to their destination
//! and renamed into place, so readers never observe a half-written file.

use crate::error::Result;
use crate::report::time::filename_timestamp;
use crate::report::{RunReport, REPORT_FILE_PREFIX};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Directory a file lives in, treating a bare file name as the current directory.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
///
/// The parent directory is created if it does not exist.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = parent_dir(path);
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.write_all(b"\n")?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

/// `test-report-<timestamp>.json` for the given instant.
pub fn report_file_name(time: DateTime<Utc>) -> String {
    format!("{}{}.json", REPORT_FILE_PREFIX, filename_timestamp(time))
}

/// Pick a report path in `dir` that does not exist yet.
///
/// Two recorders finishing within the same second would otherwise share a
/// file name; later ones get a `-1`, `-2`, ... suffix.
fn unused_report_path(dir: &Path, time: DateTime<Utc>) -> PathBuf {
    let stamp = filename_timestamp(time);
    let mut candidate = dir.join(report_file_name(time));
    let mut n = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{}{}-{}.json", REPORT_FILE_PREFIX, stamp, n));
        n += 1;
    }
    candidate
}

/// Write `report` into `dir` under a timestamped name and return the path used.
pub fn write_run_report(dir: &Path, report: &RunReport, time: DateTime<Utc>) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = unused_report_path(dir, time);
    write_json_atomic(&path, report)?;
    Ok(path)
}
