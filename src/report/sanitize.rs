//! Stripping terminal escape codes from error text

use once_cell::sync::Lazy;
use regex::Regex;

// SGR colour codes and erase-line codes, introduced by ESC [ or the 8-bit CSI.
static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x1b\x{9b}]\[\d{1,2}(;\d{1,2})?[mK]").expect("valid regex"));

/// Remove ANSI colour escapes and surrounding whitespace.
///
/// `None` and empty input both sanitize to an empty string.
pub fn sanitize_error_message(message: Option<&str>) -> String {
    match message {
        Some(message) => ANSI_ESCAPE.replace_all(message, "").trim().to_string(),
        None => String::new(),
    }
}

/// The first line of a sanitized message, for compact display.
pub fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_colour_codes() {
        let raw = "\u{1b}[31mexpected\u{1b}[39m true \u{1b}[1;32mgot\u{1b}[0m false";
        assert_eq!(
            sanitize_error_message(Some(raw)),
            "expected true got false"
        );
    }

    #[test]
    fn test_strips_erase_line_and_csi() {
        assert_eq!(sanitize_error_message(Some("\u{9b}[2Kdone")), "done");
        assert_eq!(sanitize_error_message(Some("\u{1b}[Kdone")), "\u{1b}[Kdone");
    }

    #[test]
    fn test_trims_whitespace_but_keeps_lines() {
        let raw = "  Error: boom\n    at spec.js:10  \n";
        assert_eq!(
            sanitize_error_message(Some(raw)),
            "Error: boom\n    at spec.js:10"
        );
    }

    #[test]
    fn test_missing_message() {
        assert_eq!(sanitize_error_message(None), "");
        assert_eq!(sanitize_error_message(Some("")), "");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("Error: boom\n    at x"), "Error: boom");
        assert_eq!(first_line(""), "");
    }
}
