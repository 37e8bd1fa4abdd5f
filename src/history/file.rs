//! File-backed history log
//!
//! The log is a single JSON array of records, newest last. It is always
//! rewritten as a whole.

use crate::error::{Error, Result};
use crate::history::{HistoryRecord, HistoryStore};
use crate::report::write_json_atomic;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileHistoryStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let data = fs::read_to_string(&self.path)?;
        let value: serde_json::Value = serde_json::from_str(&data)?;
        if !value.is_array() {
            return Err(Error::Parse(format!(
                "History file {} does not contain a JSON array",
                self.path.display()
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    fn save(&mut self, records: &[HistoryRecord]) -> Result<()> {
        write_json_atomic(&self.path, records)
    }
}
