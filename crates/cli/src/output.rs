//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use droidcfg_core::error::Error;
use owo_colors::{OwoColorize, Stream};

/// Status message helpers
///
/// Colors are applied only when the target stream supports them and
/// `owo_colors::set_override(false)` has not been called.
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".if_supports_color(Stream::Stdout, |t| t.green()), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".if_supports_color(Stream::Stderr, |t| t.yellow()), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.if_supports_color(Stream::Stdout, |t| t.bold()));
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print a resolution error with its code, context and suggestion
    pub fn failure(err: &Error) {
        let code = err.code.to_string();
        eprintln!(
            "{} {} {}",
            "✗".if_supports_color(Stream::Stderr, |t| t.red()),
            code.if_supports_color(Stream::Stderr, |t| t.dimmed()),
            err.message
        );
        if let Some(context) = &err.context {
            eprintln!(
                "  {} {}",
                "context:".if_supports_color(Stream::Stderr, |t| t.dimmed()),
                context
            );
        }
        if let Some(suggestion) = &err.suggestion {
            eprintln!(
                "  {} {}",
                "hint:".if_supports_color(Stream::Stderr, |t| t.cyan()),
                suggestion
            );
        }
    }
}

/// Render rows as `key  value  note`, with the key column padded to the widest key
pub fn format_table(rows: &[(String, String, String)]) -> Vec<String> {
    let width = rows.iter().map(|(k, _, _)| k.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(key, value, note)| {
            if note.is_empty() {
                format!("{:<width$}  {}", key, value, width = width)
            } else {
                format!("{:<width$}  {}  ({})", key, value, note, width = width)
            }
        })
        .collect()
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(k: &str, v: &str, n: &str) -> (String, String, String) {
        (k.to_string(), v.to_string(), n.to_string())
    }

    #[test]
    fn test_format_table_aligns_keys() {
        let lines = format_table(&[
            row("minSdk", "23", "literal"),
            row("applicationId", "com.example.app", ""),
        ]);
        assert_eq!(lines[0], "minSdk         23  (literal)");
        assert_eq!(lines[1], "applicationId  com.example.app");
    }

    #[test]
    fn test_format_table_empty() {
        assert!(format_table(&[]).is_empty());
    }

    #[test]
    fn test_format_count_singular() {
        assert_eq!(format_count(1, "warning", "warnings"), "1 warning");
    }

    #[test]
    fn test_format_count_plural() {
        assert_eq!(format_count(3, "warning", "warnings"), "3 warnings");
    }
}
