//! Color handling for terminal output.
//!
//! The `--color` flag follows the usual always/never/auto convention;
//! auto disables colors when stdout is not a terminal or when `NO_COLOR`
//! is set (see <https://no-color.org/>).

use std::io::IsTerminal;

use clap::ValueEnum;

/// Color output mode, selected by the `--color` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Colorize even when stdout is not a terminal.
    Always,
    /// Plain output.
    Never,
    /// Colorize interactive terminals unless `NO_COLOR` is set.
    #[default]
    Auto,
}

impl ColorMode {
    /// Whether output produced under this mode should carry ANSI colors.
    pub fn is_enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
        }
    }
}
