//! Record a runner event stream as a JSON run report

use crate::commands::utils::{base_dir, load_config, resolve};
use crate::commands::Command;
use crate::error::Result;
use crate::events::replay;
use crate::recorder::{
    BufferedLogProvider, CommandScreenshotProvider, ExecutionId, RecorderOptions, ResultRecorder,
    ScreenshotOption,
};
use crate::ui::UI;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

pub struct RecordCommand {
    base_path: Option<String>,
    input: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    screenshot_option: Option<ScreenshotOption>,
    execution_id: Option<String>,
}

impl RecordCommand {
    pub fn new(base_path: Option<String>) -> Self {
        RecordCommand {
            base_path,
            input: None,
            output_dir: None,
            screenshot_option: None,
            execution_id: None,
        }
    }

    /// Read events from a file instead of stdin
    pub fn with_input(mut self, input: Option<PathBuf>) -> Self {
        self.input = input;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_screenshot_option(mut self, option: Option<ScreenshotOption>) -> Self {
        self.screenshot_option = option;
        self
    }

    /// Join an existing execution instead of minting a new id
    pub fn with_execution_id(mut self, execution_id: Option<String>) -> Self {
        self.execution_id = execution_id;
        self
    }
}

impl Command for RecordCommand {
    fn execute(&self, ui: &mut dyn UI) -> Result<i32> {
        let base = base_dir(self.base_path.as_deref());
        let config = load_config(&base)?;

        let output_dir = match &self.output_dir {
            Some(dir) => resolve(&base, dir),
            None => resolve(&base, config.output_dir()),
        };
        let execution_id = self
            .execution_id
            .clone()
            .map(ExecutionId::new)
            .unwrap_or_else(ExecutionId::generate);

        let mut options = RecorderOptions::new(output_dir, execution_id);
        options.screenshot_option = self.screenshot_option.unwrap_or(config.screenshot_option);
        options.browser_name = config.browser_name.clone();

        let log_buffer = BufferedLogProvider::new();
        let mut recorder =
            ResultRecorder::start(options).with_log_provider(Box::new(log_buffer.clone()));
        if let Some(command) = &config.screenshot_command {
            recorder = recorder
                .with_screenshot_provider(Box::new(CommandScreenshotProvider::new(command, &base)));
        }

        let reader: Box<dyn BufRead> = match &self.input {
            Some(path) => Box::new(BufReader::new(File::open(resolve(&base, path))?)),
            None => Box::new(io::stdin().lock()),
        };

        let summary = replay(reader, recorder, Some(&log_buffer))?;

        ui.output(&format!(
            "Recorded {} test result(s) to {}",
            summary.recorded,
            summary.report_path.display()
        ))?;
        if summary.duplicates > 0 {
            ui.output(&format!(
                "Ignored {} duplicate result(s)",
                summary.duplicates
            ))?;
        }
        if summary.skipped_lines > 0 {
            ui.warning(&format!(
                "Skipped {} malformed event line(s)",
                summary.skipped_lines
            ))?;
        }

        if summary.failed > 0 {
            ui.output(&format!("{} test(s) failed", summary.failed))?;
            Ok(1)
        } else {
            Ok(0)
        }
    }

    fn name(&self) -> &str {
        "record"
    }

    fn help(&self) -> &str {
        "Record a runner event stream as a JSON run report"
    }
}
