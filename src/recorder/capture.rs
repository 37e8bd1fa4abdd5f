//! Screenshot and browser log collaborators
//!
//! The recorder only knows these traits. Failures reported through them are
//! logged by the recorder and never fail the result being recorded.

use crate::error::{Error, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::process::Command;
use std::sync::{Arc, Mutex};

/// Something that can capture the current screen.
pub trait ScreenshotProvider {
    /// Capture the screen, returning the image bytes base64-encoded.
    fn take_screenshot(&mut self) -> Result<String>;
}

/// Something that can hand over buffered browser console entries.
pub trait LogProvider {
    /// Fetch and drain the entries buffered since the last call.
    fn fetch_logs(&mut self) -> Result<Vec<Value>>;
}

/// Captures screenshots by running a shell command that prints base64 image
/// data on stdout.
pub struct CommandScreenshotProvider {
    command: String,
    base_dir: PathBuf,
}

impl CommandScreenshotProvider {
    pub fn new(command: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        CommandScreenshotProvider {
            command: command.into(),
            base_dir: base_dir.into(),
        }
    }
}

impl ScreenshotProvider for CommandScreenshotProvider {
    fn take_screenshot(&mut self) -> Result<String> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .current_dir(&self.base_dir)
            .output()
            .map_err(|e| Error::Capture(format!("Failed to execute screenshot_command: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Capture(format!(
                "screenshot_command failed with status: {}",
                output.status
            )));
        }

        let data = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if data.is_empty() {
            return Err(Error::Capture(
                "screenshot_command produced no output".to_string(),
            ));
        }
        Ok(data)
    }
}

/// An in-process log buffer. Clones share the same entries, so one handle
/// can be given to the recorder while another keeps feeding it.
#[derive(Debug, Clone, Default)]
pub struct BufferedLogProvider {
    entries: Arc<Mutex<Vec<Value>>>,
}

impl BufferedLogProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogProvider for BufferedLogProvider {
    fn fetch_logs(&mut self) -> Result<Vec<Value>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Capture("browser log buffer is poisoned".to_string()))?;
        Ok(std::mem::take(&mut *entries))
    }
}
