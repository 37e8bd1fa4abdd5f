//! Append an aggregated snapshot to the history log

use crate::aggregate::aggregate_reports;
use crate::commands::utils::{base_dir, input_dirs, load_config, resolve};
use crate::commands::Command;
use crate::error::{Error, Result};
use crate::history::{FileHistoryStore, HistoryTracker};
use crate::report::first_line;
use crate::ui::UI;
use std::path::PathBuf;

pub struct HistoryCommand {
    base_path: Option<String>,
    dirs: Vec<PathBuf>,
    history_path: Option<PathBuf>,
    max_history: Option<usize>,
}

impl HistoryCommand {
    pub fn new(base_path: Option<String>, dirs: Vec<PathBuf>) -> Self {
        HistoryCommand {
            base_path,
            dirs,
            history_path: None,
            max_history: None,
        }
    }

    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    /// Override the configured retention count
    pub fn with_max_history(mut self, max_history: Option<usize>) -> Self {
        self.max_history = max_history;
        self
    }
}

impl Command for HistoryCommand {
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
        let max_history = self.max_history.unwrap_or(config.history);

        let dirs = input_dirs(&base, &self.dirs, &config);
        let aggregation = aggregate_reports(&dirs);
        for path in &aggregation.files_skipped {
            ui.warning(&format!("Skipped unreadable report {}", path.display()))?;
        }

        let mut tracker =
            HistoryTracker::new(FileHistoryStore::new(&history_path)).with_max_history(max_history);
        let update = tracker.update(&aggregation.snapshot);
        let record = &update.record;

        ui.output(&format!(
            "History record {}: {} tests, {} passed, {} failed",
            record.timestamp, record.total_tests, record.passed, record.failed
        ))?;
        for (name, suite) in &record.suites {
            let cmp = &suite.defect_comparison;
            if cmp.new_defects.is_empty() && cmp.resolved_defects.is_empty() {
                continue;
            }
            ui.output(&format!(
                "  {}: {} new, {} resolved",
                name,
                cmp.new_defects.len(),
                cmp.resolved_defects.len()
            ))?;
            for message in &cmp.new_defects {
                ui.output(&format!("    + {}", first_line(message)))?;
            }
            for message in &cmp.resolved_defects {
                ui.output(&format!("    - {}", first_line(message)))?;
            }
        }

        if !update.persisted {
            ui.warning(&format!(
                "History could not be written to {}",
                history_path.display()
            ))?;
            return Ok(1);
        }
        ui.output(&format!(
            "{} record(s) retained in {}",
            update.retained,
            history_path.display()
        ))?;
        Ok(0)
    }

    fn name(&self) -> &str {
        "history"
    }

    fn help(&self) -> &str {
        "Aggregate run reports and append the result to the history log"
    }
}
