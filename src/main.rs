//! treport - Command-line tool for test run reports

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use testreport::commands::*;
use testreport::config::parse_history;
use testreport::logging::init_logging;
use testreport::recorder::ScreenshotOption;
use testreport::ui::{CliUI, UI};

#[derive(Parser)]
#[command(name = "treport")]
#[command(about = "Record, aggregate and track test run reports", long_about = None)]
struct Cli {
    /// Project path (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    directory: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a JSON-lines runner event stream as a run report
    Record {
        /// Read events from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,

        /// Directory the run report is written to
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// When to take screenshots (No, OnFailure, Full)
        #[arg(long)]
        screenshots: Option<ScreenshotOption>,

        /// Execution id shared with other recorders of the same run
        #[arg(long, env = "TESTREPORT_EXECUTION_ID")]
        execution_id: Option<String>,
    },

    /// Aggregate run reports and show a summary
    Aggregate {
        /// Report directories (defaults to the configured ones)
        dirs: Vec<PathBuf>,

        /// Print the aggregation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Aggregate run reports and append the result to the history log
    History {
        /// Report directories (defaults to the configured ones)
        dirs: Vec<PathBuf>,

        /// History log file
        #[arg(long)]
        history_path: Option<PathBuf>,

        /// Number of records to retain
        #[arg(long, value_parser = parse_history)]
        max_history: Option<usize>,
    },

    /// Show per-suite trends from the history log
    Trend {
        /// History log file
        #[arg(long)]
        history_path: Option<PathBuf>,
    },
}

fn build_command(directory: Option<String>, command: Commands) -> Box<dyn Command> {
    match command {
        Commands::Record {
            input,
            output_dir,
            screenshots,
            execution_id,
        } => Box::new(
            RecordCommand::new(directory)
                .with_input(input)
                .with_output_dir(output_dir)
                .with_screenshot_option(screenshots)
                .with_execution_id(execution_id),
        ),
        Commands::Aggregate { dirs, json } => {
            Box::new(AggregateCommand::new(directory, dirs).with_json(json))
        }
        Commands::History {
            dirs,
            history_path,
            max_history,
        } => Box::new(
            HistoryCommand::new(directory, dirs)
                .with_history_path(history_path)
                .with_max_history(max_history),
        ),
        Commands::Trend { history_path } => {
            Box::new(TrendCommand::new(directory).with_history_path(history_path))
        }
    }
}

fn run(cli: Cli, ui: &mut dyn UI) -> anyhow::Result<i32> {
    init_logging(cli.verbose, cli.quiet)?;

    let cmd = build_command(cli.directory, cli.command);
    let code = cmd
        .execute(ui)
        .with_context(|| format!("{} failed", cmd.name()))?;
    Ok(code)
}

fn main() {
    let cli = Cli::parse();
    let mut ui = CliUI::new();

    match run(cli, &mut ui) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            let _ = ui.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}
