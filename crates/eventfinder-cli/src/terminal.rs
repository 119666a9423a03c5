//! Terminal styling and color detection.
//!
//! Text output is plain unless stdout is a terminal that accepts ANSI codes.

use std::io::IsTerminal;

/// ANSI escape codes used by the text renderers.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";
    /// Bright bold white for event titles.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for secondary lines (dates, context, hints).
    pub const GRAY: &str = "\x1b[90m";
    /// Cyan for category tags and maneuvers.
    pub const CYAN: &str = "\x1b[36m";
    /// Green for prices and totals.
    pub const GREEN: &str = "\x1b[32m";
    /// Yellow for notices.
    pub const YELLOW: &str = "\x1b[33m";
}

/// Resolved color codes, or empty strings when color is disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub title: &'static str,
    pub muted: &'static str,
    pub tag: &'static str,
    pub price: &'static str,
    pub notice: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            title: colors::WHITE_BOLD,
            muted: colors::GRAY,
            tag: colors::CYAN,
            price: colors::GREEN,
            notice: colors::YELLOW,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            title: "",
            muted: "",
            tag: "",
            price: "",
            notice: "",
        }
    }

    /// `colored()` when [`supports_color`] says so, otherwise `plain()`.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Check if stdout should receive ANSI color codes.
///
/// Respects `NO_COLOR` (https://no-color.org/) and `TERM=dumb`, and never
/// colors output that is piped or redirected.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    std::io::stdout().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_palette_is_empty() {
        let palette = ColorPalette::plain();
        assert!(palette.reset.is_empty());
        assert!(palette.title.is_empty());
        assert!(palette.notice.is_empty());
    }

    #[test]
    fn colored_palette_uses_ansi_codes() {
        let palette = ColorPalette::colored();
        assert_eq!(palette.reset, colors::RESET);
        assert!(palette.price.starts_with("\x1b["));
    }
}
