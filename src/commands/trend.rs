//! Show per-suite trends from the history log

use crate::commands::utils::{base_dir, load_config, resolve};
use crate::commands::Command;
use crate::error::{Error, Result};
use crate::history::{suite_trends, FileHistoryStore, HistoryTracker};
use crate::ui::UI;
use std::path::PathBuf;

pub struct TrendCommand {
    base_path: Option<String>,
    history_path: Option<PathBuf>,
}

impl TrendCommand {
    pub fn new(base_path: Option<String>) -> Self {
        TrendCommand {
            base_path,
            history_path: None,
        }
    }

    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }
}

impl Command for TrendCommand {
    fn execute(&self, ui: &mut dyn UI) -> Result<i32> {
        let base = base_dir(self.base_path.as_deref());
        let config = load_config(&base)?;

        let history_path = self
            .history_path
            .as_ref()
            .or(config.history_path.as_ref())
            .map(|p| resolve(&base, p))
            .ok_or_else(|| {
                Error::Config("No history path given and none configured".to_string())
            })?;

        let log = HistoryTracker::new(FileHistoryStore::new(history_path)).load();
        if log.is_empty() {
            ui.output("No history recorded")?;
            return Ok(0);
        }

        for (suite, points) in suite_trends(&log) {
            ui.output(&format!("{}:", suite))?;
            for point in points {
                let mut line = format!(
                    "  {}  {}/{} passed ({}%)",
                    point.timestamp, point.passed, point.total_tests, point.pass_rate
                );
                if point.has_new_issues() {
                    line.push_str(&format!("  +{} new", point.new_issues.len()));
                }
                if point.has_resolved_issues() {
                    line.push_str(&format!("  -{} resolved", point.resolved_issues.len()));
                }
                ui.output(&line)?;
            }
        }
        Ok(0)
    }

    fn name(&self) -> &str {
        "trend"
    }

    fn help(&self) -> &str {
        "Show pass rates and defect changes per suite over the history log"
    }
}
