//! Aggregate run reports into a single snapshot

use crate::aggregate::aggregate_reports;
use crate::commands::utils::{base_dir, input_dirs, load_config};
use crate::commands::Command;
use crate::error::Result;
use crate::report::first_line;
use crate::ui::UI;
use std::path::PathBuf;

pub struct AggregateCommand {
    base_path: Option<String>,
    dirs: Vec<PathBuf>,
    json: bool,
}

impl AggregateCommand {
    /// Aggregate `dirs`, or the configured report directories when empty.
    pub fn new(base_path: Option<String>, dirs: Vec<PathBuf>) -> Self {
        AggregateCommand {
            base_path,
            dirs,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

impl Command for AggregateCommand {
    fn execute(&self, ui: &mut dyn UI) -> Result<i32> {
        let base = base_dir(self.base_path.as_deref());
        let config = load_config(&base)?;
        let dirs = input_dirs(&base, &self.dirs, &config);

        let aggregation = aggregate_reports(&dirs);
        for path in &aggregation.files_skipped {
            ui.warning(&format!("Skipped unreadable report {}", path.display()))?;
        }

        let snapshot = &aggregation.snapshot;
        if self.json {
            ui.output_json(&serde_json::to_value(&aggregation)?)?;
        } else {
            ui.output(&format!(
                "Read {} report(s): {} tests, {} passed, {} failed",
                aggregation.files_read.len(),
                snapshot.total_tests,
                snapshot.passed,
                snapshot.failed
            ))?;
            if let (Some(start), Some(end)) =
                (&snapshot.execution_start_time, &snapshot.execution_end_time)
            {
                ui.output(&format!("Execution window: {} to {}", start, end))?;
            }

            for (name, suite) in &snapshot.suites {
                ui.output(&format!(
                    "  {}: {} tests, {} passed, {} failed",
                    name, suite.total_tests, suite.passed, suite.failed
                ))?;
            }

            let unique = aggregation.unique_errors();
            if !unique.is_empty() {
                ui.output(&format!("Unique errors ({}):", unique.len()))?;
                for (message, count) in unique {
                    ui.output(&format!("  {}x {}", count, first_line(&message)))?;
                }
            }
        }

        Ok(if snapshot.failed > 0 { 1 } else { 0 })
    }

    fn name(&self) -> &str {
        "aggregate"
    }

    fn help(&self) -> &str {
        "Aggregate run reports and show a summary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{RunMetadata, RunReport, TestResult};
    use crate::ui::test_ui::TestUI;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_report(dir: &Path, name: &str, results: Vec<TestResult>) {
        let report = RunReport {
            metadata: RunMetadata {
                execution_id: "1".to_string(),
                browser_name: "chrome".to_string(),
                execution_start_time: "Tue, 08 Apr 2025 10:00:00 GMT".to_string(),
                execution_end_time: "Tue, 08 Apr 2025 10:05:00 GMT".to_string(),
                total_time_in_minutes: "5.00".to_string(),
            },
            test_results: results,
        };
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), serde_json::to_string(&report).unwrap()).unwrap();
    }

    #[test]
    fn test_aggregate_summary() {
        let temp = TempDir::new().unwrap();
        let reports = temp.path().join("reports");
        write_report(
            &reports,
            "test-report-a.json",
            vec![
                TestResult::passed("1", "Login", "opens"),
                TestResult::failed("2", "Login", "submits", "timeout\nat line 3"),
            ],
        );
        fs::write(reports.join("test-report-bad.json"), "{not json").unwrap();

        let mut ui = TestUI::new();
        let cmd = AggregateCommand::new(Some(temp.path().to_string_lossy().to_string()), vec![]);
        let result = cmd.execute(&mut ui);

        assert_eq!(result.unwrap(), 1);
        assert!(ui.printed("Read 1 report(s): 2 tests, 1 passed, 1 failed"));
        assert!(ui.printed("Login: 2 tests, 1 passed, 1 failed"));
        assert!(ui.printed("1x timeout"));
        assert!(!ui.printed("at line 3"));
        assert_eq!(ui.errors.len(), 1);
        assert!(ui.errors[0].starts_with("Warning: Skipped unreadable report"));
    }

    #[test]
    fn test_aggregate_json_all_passing() {
        let temp = TempDir::new().unwrap();
        write_report(
            &temp.path().join("runs"),
            "test-report-a.json",
            vec![TestResult::passed("1", "Cart", "adds")],
        );

        let mut ui = TestUI::new();
        let cmd = AggregateCommand::new(
            Some(temp.path().to_string_lossy().to_string()),
            vec![PathBuf::from("runs")],
        )
        .with_json(true);
        let result = cmd.execute(&mut ui);

        assert_eq!(result.unwrap(), 0);
        let json: serde_json::Value = serde_json::from_str(&ui.output[0]).unwrap();
        assert_eq!(json["snapshot"]["totalTests"], 1);
        assert_eq!(json["snapshot"]["suites"]["Cart"]["passed"], 1);
        assert_eq!(json["metadata"][0]["browserName"], "chrome");
    }

    #[test]
    fn test_aggregate_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let mut ui = TestUI::new();
        let cmd = AggregateCommand::new(
            Some(temp.path().to_string_lossy().to_string()),
            vec![PathBuf::from("absent")],
        );

        assert_eq!(cmd.execute(&mut ui).unwrap(), 0);
        assert!(ui.printed("Read 0 report(s): 0 tests"));
    }
}
