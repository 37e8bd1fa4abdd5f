//! Utility functions for command implementation

use crate::config::ReportConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Base directory for a command (or current directory if None)
pub fn base_dir(base_path: Option<&str>) -> PathBuf {
    PathBuf::from(base_path.unwrap_or("."))
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Load the configuration found in `base`.
pub fn load_config(base: &Path) -> Result<ReportConfig> {
    ReportConfig::from_directory(base)
}

/// Input directories for aggregation: the explicit ones if any, otherwise
/// those configured, all resolved against `base`.
pub fn input_dirs(base: &Path, explicit: &[PathBuf], config: &ReportConfig) -> Vec<PathBuf> {
    let dirs = if explicit.is_empty() {
        config.input_dirs()
    } else {
        explicit.to_vec()
    };
    dirs.iter().map(|d| resolve(base, d)).collect()
}
