//! Logging setup
//!
//! Diagnostics go through `tracing` and are written to stderr, so that
//! stdout stays reserved for command output (including `--json` documents).

use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Pick the default filter directive from the verbosity flags.
///
/// `RUST_LOG` still wins when it is set.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber for the command-line tool.
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Other(format!("Failed to initialise logging: {}", e)))
}

/// Route log output through the test harness. Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
