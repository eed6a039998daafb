//! Terminal Detection
//!
//! Width and color support of the output terminal.

use console::Term;

/// Width used when nothing else is known
pub const FALLBACK_COLUMNS: usize = 80;

/// When to emit ANSI styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Only when stdout is a terminal
    #[default]
    Auto,
    /// Always
    Always,
    /// Never
    Never,
}

impl ColorMode {
    /// Resolve against the actual stdout and the `CLICOLOR` conventions
    pub fn enabled(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => console::colors_enabled(),
        }
    }
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorMode::Auto),
            "always" | "yes" => Ok(ColorMode::Always),
            "never" | "no" => Ok(ColorMode::Never),
            other => Err(format!("Unknown color mode: {}", other)),
        }
    }
}

/// Terminal width in columns.
///
/// Order: explicit override, `COLUMNS`, the stdout window size, then
/// [`FALLBACK_COLUMNS`]. Zero is never returned.
pub fn terminal_width(explicit: Option<usize>) -> usize {
    explicit
        .filter(|&w| w > 0)
        .or_else(|| columns_from_env(std::env::var("COLUMNS").ok().as_deref()))
        .or_else(window_columns)
        .unwrap_or(FALLBACK_COLUMNS)
}

fn columns_from_env(value: Option<&str>) -> Option<usize> {
    value?.trim().parse().ok().filter(|&w: &usize| w > 0)
}

fn window_columns() -> Option<usize> {
    let (_rows, cols) = Term::stdout().size_checked()?;
    (cols > 0).then_some(cols as usize)
}
