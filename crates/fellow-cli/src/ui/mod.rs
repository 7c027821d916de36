//! Terminal output layer for the fellow CLI.
//!
//! Human-facing output goes through this module so every subcommand
//! shares the same prefixes, colors, and table shapes; machine-facing
//! output bypasses it entirely via the `--json` flags.
//!
//! - [`color`]: `--color` flag handling, `NO_COLOR`, TTY detection
//! - [`style`]: message prefixes and ANSI styling
//! - [`format`]: relative times, thousands separators, truncation
//! - [`table`]: comfy-table rendering for `fellow status`

pub mod color;
pub mod format;
pub mod style;
pub mod table;

pub use color::ColorMode;
pub use style::{MessageType, Style};
