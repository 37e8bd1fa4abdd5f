//! Test utilities for UI testing

use crate::error::Result;
use crate::ui::UI;

/// A UI implementation for testing that captures output in vectors
#[derive(Default)]
pub struct TestUI {
    pub output: Vec<String>,
    pub errors: Vec<String>,
}

impl TestUI {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any output line contains `needle`.
    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }
}

impl UI for TestUI {
    fn output(&mut self, message: &str) -> Result<()> {
        self.output.push(message.to_string());
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        self.errors.push(message.to_string());
        Ok(())
    }

    fn warning(&mut self, message: &str) -> Result<()> {
        self.errors.push(format!("Warning: {}", message));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_ui_captures() {
        let mut ui = TestUI::new();
        ui.output("summary line").unwrap();
        ui.error("error message").unwrap();
        ui.warning("warning message").unwrap();
        assert!(ui.printed("summary"));
        assert!(!ui.printed("missing"));
        assert_eq!(ui.errors, vec!["error message", "Warning: warning message"]);
    }
}
