//! Styled terminal messages.
//!
//! Every command prints through [`Style`], which carries the resolved
//! color choice and keeps the bracketed prefixes (`[ok]`, `[err]`, ...)
//! consistent across subcommands. With colors off, the same text is
//! produced minus the ANSI escapes, so output stays grep-friendly.

use owo_colors::{AnsiColors, OwoColorize};

use super::color::ColorMode;

/// Category prefix for a printed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// The operation completed.
    Ok,
    /// The operation failed and cannot continue.
    Err,
    /// Completed, with caveats worth reading.
    Warn,
    /// Neutral status.
    Info,
    /// An actionable next step.
    Hint,
    /// Intentionally not processed.
    Skip,
}

impl MessageType {
    /// The literal prefix shown before the message text.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Ok => "[ok]",
            Self::Err => "[err]",
            Self::Warn => "[warn]",
            Self::Info => "[info]",
            Self::Hint => "[hint]",
            Self::Skip => "[skip]",
        }
    }

    fn color(self) -> AnsiColors {
        match self {
            Self::Ok => AnsiColors::Green,
            Self::Err => AnsiColors::Red,
            Self::Warn => AnsiColors::Yellow,
            Self::Info => AnsiColors::Blue,
            Self::Hint => AnsiColors::Cyan,
            Self::Skip => AnsiColors::BrightBlack,
        }
    }
}

/// Formatting helper for all human-facing CLI output.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    colored: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self::new(ColorMode::Auto)
    }
}

impl Style {
    /// Resolve a color mode into a concrete style.
    pub fn new(mode: ColorMode) -> Self {
        Self {
            colored: mode.is_enabled(),
        }
    }

    /// Whether this style emits ANSI colors.
    pub fn colors_enabled(&self) -> bool {
        self.colored
    }

    /// A prefixed one-line message, e.g. `[ok] Knowledge store updated`.
    pub fn message(&self, kind: MessageType, text: &str) -> String {
        if self.colors_enabled() {
            format!("{} {}", kind.prefix().color(kind.color()), text)
        } else {
            format!("{} {}", kind.prefix(), text)
        }
    }

    /// An indented `label: value` line following a message.
    pub fn message_detail(&self, label: &str, value: &str) -> String {
        format!("     {label}: {value}")
    }

    /// A section header.
    pub fn section(&self, title: &str) -> String {
        if self.colors_enabled() {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// An error message with optional cause and hint trailers.
    pub fn error_with_context(
        &self,
        msg: &str,
        cause: Option<&str>,
        hint: Option<&str>,
    ) -> String {
        let mut out = self.message(MessageType::Err, msg);
        if let Some(cause) = cause {
            out.push_str(&format!("\n      Cause: {cause}"));
        }
        if let Some(hint) = hint {
            out.push_str(&format!("\n      Hint: {hint}"));
        }
        out
    }

    /// A change-list line; the `+`/`-`/`~` markers get diff-style colors.
    pub fn list_item(&self, marker: &str, text: &str) -> String {
        let marker = if self.colors_enabled() {
            match marker {
                "+" => marker.green().to_string(),
                "-" => marker.red().to_string(),
                "~" => marker.yellow().to_string(),
                _ => marker.to_string(),
            }
        } else {
            marker.to_string()
        };
        format!("  {marker} {text}")
    }

    /// A `key: value` line with a dimmed key.
    pub fn key_value(&self, key: &str, value: &str) -> String {
        if self.colors_enabled() {
            format!("{}: {}", key.dimmed(), value)
        } else {
            format!("{key}: {value}")
        }
    }

    /// A commit hash abbreviated to twelve characters.
    pub fn commit(&self, hash: &str) -> String {
        let short: String = hash.chars().take(12).collect();
        if self.colors_enabled() {
            short.yellow().to_string()
        } else {
            short
        }
    }

    /// A file path.
    pub fn file_path(&self, path: &str) -> String {
        if self.colors_enabled() {
            path.cyan().to_string()
        } else {
            path.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Style {
        Style::new(ColorMode::Never)
    }

    #[test]
    fn prefixes_are_stable() {
        assert_eq!(MessageType::Ok.prefix(), "[ok]");
        assert_eq!(MessageType::Err.prefix(), "[err]");
        assert_eq!(MessageType::Warn.prefix(), "[warn]");
        assert_eq!(MessageType::Info.prefix(), "[info]");
        assert_eq!(MessageType::Hint.prefix(), "[hint]");
        assert_eq!(MessageType::Skip.prefix(), "[skip]");
    }

    #[test]
    fn plain_message_has_no_escapes() {
        assert_eq!(plain().message(MessageType::Ok, "Done"), "[ok] Done");
        assert_eq!(plain().message(MessageType::Err, "Failed"), "[err] Failed");
    }

    #[test]
    fn detail_lines_indent_under_the_prefix() {
        assert_eq!(plain().message_detail("Count", "42"), "     Count: 42");
    }

    #[test]
    fn error_context_stacks_cause_and_hint() {
        let out = plain().error_with_context(
            "Merge failed",
            Some("delta missing"),
            Some("Run the extractor first"),
        );
        assert!(out.starts_with("[err] Merge failed"));
        assert!(out.contains("Cause: delta missing"));
        assert!(out.contains("Hint: Run the extractor first"));
    }

    #[test]
    fn list_items_carry_their_marker() {
        assert_eq!(plain().list_item("+", "file.py"), "  + file.py");
        assert_eq!(plain().list_item("-", "old.py"), "  - old.py");
        assert_eq!(plain().list_item("~", "changed.py"), "  ~ changed.py");
    }

    #[test]
    fn commits_are_abbreviated() {
        assert_eq!(plain().commit("abc123def4567890"), "abc123def456");
        assert_eq!(plain().commit("short"), "short");
    }
}
