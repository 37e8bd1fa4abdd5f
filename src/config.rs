//! Configuration file (.testreport.conf) parsing and handling
//!
//! The .testreport.conf file uses INI format with a [DEFAULT] section. Every
//! key is optional:
//!
//! ```ini
//! [DEFAULT]
//! output_file=reports/json/test-report.json
//! screenshot_option=OnFailure
//! screenshot_command=./scripts/capture-screen.sh
//! history=10
//! history_path=reports/history/history.json
//! report_paths=reports/json, reports/retries
//! browser_name=chrome
//! ```

use crate::error::{Error, Result};
use crate::history::DEFAULT_MAX_HISTORY;
use crate::recorder::ScreenshotOption;
use crate::report::writer::parent_dir;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".testreport.conf";

const DEFAULT_OUTPUT_FILE: &str = "reports/test-report.json";

/// Configuration loaded from .testreport.conf
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// Where run reports go. Only the directory part is used; report file
    /// names are always timestamped.
    pub output_file: PathBuf,

    /// When screenshots are taken
    pub screenshot_option: ScreenshotOption,

    /// Shell command printing a base64 screenshot on stdout
    pub screenshot_command: Option<String>,

    /// Number of history records to retain
    pub history: usize,

    /// History log location, if history is tracked
    pub history_path: Option<PathBuf>,

    /// Directories scanned for run reports when aggregating
    pub report_paths: Vec<PathBuf>,

    /// Browser name written into run metadata
    pub browser_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            screenshot_option: ScreenshotOption::No,
            screenshot_command: None,
            history: DEFAULT_MAX_HISTORY,
            history_path: None,
            report_paths: Vec::new(),
            browser_name: "Unknown".to_string(),
        }
    }
}

impl ReportConfig {
    /// Load `.testreport.conf` from `dir`, or the defaults when there is none.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a .testreport.conf file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", CONFIG_FILE, e)))?;

        Self::parse(&contents)
    }

    /// Parse configuration from a string
    pub fn parse(contents: &str) -> Result<Self> {
        let ini: HashMap<String, HashMap<String, String>> = serde_ini::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", CONFIG_FILE, e)))?;

        let default = ini
            .get("DEFAULT")
            .ok_or_else(|| Error::Config(format!("No [DEFAULT] section in {}", CONFIG_FILE)))?;

        let get = |key: &str| {
            default
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let mut config = ReportConfig::default();

        if let Some(output_file) = get("output_file") {
            config.output_file = PathBuf::from(output_file);
        }
        if let Some(option) = get("screenshot_option") {
            config.screenshot_option = option.parse()?;
        }
        config.screenshot_command = get("screenshot_command").map(str::to_string);
        if let Some(history) = get("history") {
            config.history = parse_history(history)?;
        }
        config.history_path = get("history_path").map(PathBuf::from);
        if let Some(paths) = get("report_paths") {
            config.report_paths = split_paths(paths);
        }
        if let Some(name) = get("browser_name") {
            config.browser_name = name.to_string();
        }

        Ok(config)
    }

    /// Directory run reports are written to.
    pub fn output_dir(&self) -> &Path {
        parent_dir(&self.output_file)
    }

    /// Input directories for aggregation, defaulting to the output directory.
    pub fn input_dirs(&self) -> Vec<PathBuf> {
        if self.report_paths.is_empty() {
            vec![self.output_dir().to_path_buf()]
        } else {
            self.report_paths.clone()
        }
    }
}

/// Validate a history retention count.
pub fn parse_history(value: &str) -> Result<usize> {
    let n: usize = value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid history value '{}': {}", value, e)))?;
    if n == 0 {
        return Err(Error::Config("history must be at least 1".to_string()));
    }
    Ok(n)
}

fn split_paths(value: &str) -> Vec<PathBuf> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_defaults() {
        let config = ReportConfig::parse("[DEFAULT]\nbrowser_name=Unknown\n").unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.output_dir(), Path::new("reports"));
        assert_eq!(config.input_dirs(), vec![PathBuf::from("reports")]);
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
[DEFAULT]
output_file=out/json/test-report.json
screenshot_option=OnFailure
screenshot_command=./capture.sh --base64
history=10
history_path=out/history/history.json
report_paths=out/json, out/retries
browser_name=firefox
"#;

        let config = ReportConfig::parse(config_str).unwrap();
        assert_eq!(config.output_dir(), Path::new("out/json"));
        assert_eq!(config.screenshot_option, ScreenshotOption::OnFailure);
        assert_eq!(
            config.screenshot_command,
            Some("./capture.sh --base64".to_string())
        );
        assert_eq!(config.history, 10);
        assert_eq!(
            config.history_path,
            Some(PathBuf::from("out/history/history.json"))
        );
        assert_eq!(
            config.input_dirs(),
            vec![PathBuf::from("out/json"), PathBuf::from("out/retries")]
        );
        assert_eq!(config.browser_name, "firefox");
    }

    #[test]
    fn test_bare_output_file_uses_current_directory() {
        let config = ReportConfig::parse("[DEFAULT]\noutput_file=report.json\n").unwrap();
        assert_eq!(config.output_dir(), Path::new("."));
    }

    #[test]
    fn test_missing_default_section() {
        let result = ReportConfig::parse("[OTHER]\nhistory=3\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("DEFAULT"));
    }

    #[test]
    fn test_invalid_screenshot_option() {
        let result = ReportConfig::parse("[DEFAULT]\nscreenshot_option=Sometimes\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_history() {
        assert!(ReportConfig::parse("[DEFAULT]\nhistory=many\n").is_err());
        let err = ReportConfig::parse("[DEFAULT]\nhistory=0\n").unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_from_directory_without_file() {
        let temp = TempDir::new().unwrap();
        let config = ReportConfig::from_directory(temp.path()).unwrap();
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn test_from_directory_with_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "[DEFAULT]\nhistory=3\n").unwrap();
        let config = ReportConfig::from_directory(temp.path()).unwrap();
        assert_eq!(config.history, 3);
    }
}
