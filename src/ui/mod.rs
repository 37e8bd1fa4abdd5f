//! User interface abstraction
//!
//! Commands write their human-readable output through the [`UI`] trait so
//! that tests can capture it. Diagnostics go through `tracing` instead.

use crate::error::Result;
use console::style;
use std::io::{self, Write};

#[cfg(test)]
pub mod test_ui;

/// Abstract UI trait for command output
pub trait UI {
    /// Output a line to the user
    fn output(&mut self, message: &str) -> Result<()>;

    /// Output an error message
    fn error(&mut self, message: &str) -> Result<()>;

    /// Output a warning message
    fn warning(&mut self, message: &str) -> Result<()>;

    /// Output a JSON document on a line of its own
    fn output_json(&mut self, value: &serde_json::Value) -> Result<()> {
        self.output(&serde_json::to_string_pretty(value)?)
    }
}

/// Command-line UI implementation
pub struct CliUI {
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl CliUI {
    /// Creates a new command-line UI instance using stdout and stderr.
    pub fn new() -> Self {
        CliUI {
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        }
    }
}

impl Default for CliUI {
    fn default() -> Self {
        Self::new()
    }
}

impl UI for CliUI {
    fn output(&mut self, message: &str) -> Result<()> {
        writeln!(self.stdout, "{}", message)?;
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        writeln!(self.stderr, "{} {}", style("Error:").red().bold(), message)?;
        Ok(())
    }

    fn warning(&mut self, message: &str) -> Result<()> {
        writeln!(self.stderr, "{} {}", style("Warning:").yellow(), message)?;
        Ok(())
    }
}
