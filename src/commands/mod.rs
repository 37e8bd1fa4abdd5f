//! Command system for testreport
//!
//! Each subcommand of the command-line tool is a [`Command`] returning the
//! process exit code.

use crate::error::Result;
use crate::ui::UI;

pub mod aggregate;
pub mod history;
pub mod record;
pub mod trend;
mod utils;

pub use aggregate::AggregateCommand;
pub use history::HistoryCommand;
pub use record::RecordCommand;
pub use trend::TrendCommand;

/// Trait that all commands must implement
pub trait Command {
    /// Execute the command
    fn execute(&self, ui: &mut dyn UI) -> Result<i32>;

    /// Get the command name
    fn name(&self) -> &str;

    /// Get command help text
    fn help(&self) -> &str;
}
