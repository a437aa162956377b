//! Visual theme and styling.

use console::Style;

/// Styles used when drawing the task tree.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Style for the success glyph (green).
    pub success: Style,
    /// Style for the failure glyph and failure messages (red).
    pub failure: Style,
    /// Style for the running glyph and info annotations (yellow).
    pub progress: Style,
    /// Style for secondary text such as the arrow separator (dim).
    pub dim: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    /// Create the default theme; styling follows terminal detection.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            failure: Style::new().red(),
            progress: Style::new().yellow(),
            dim: Style::new().dim(),
        }
    }

    /// Create the default theme with styling forced on.
    pub fn forced() -> Self {
        let theme = Self::new();
        Self {
            success: theme.success.force_styling(true),
            failure: theme.failure.force_styling(true),
            progress: theme.progress.force_styling(true),
            dim: theme.dim.force_styling(true),
        }
    }

    /// Create a theme without colors (for non-TTY or `--colors false`).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            failure: Style::new(),
            progress: Style::new(),
            dim: Style::new(),
        }
    }

    /// Forced theme when `colors` is set, plain theme otherwise.
    pub fn for_colors(colors: bool) -> Self {
        if colors {
            Self::forced()
        } else {
            Self::plain()
        }
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_adds_no_escapes() {
        let theme = Theme::plain();
        assert_eq!(theme.success.apply_to("✓").to_string(), "✓");
        assert_eq!(theme.failure.apply_to("boom").to_string(), "boom");
    }

    #[test]
    fn forced_theme_adds_escapes() {
        let theme = Theme::forced();
        let styled = theme.failure.apply_to("boom").to_string();
        assert!(styled.contains("\u{1b}["));
        assert!(styled.contains("boom"));
    }

    #[test]
    fn for_colors_selects_theme() {
        let on = Theme::for_colors(true).progress.apply_to("x").to_string();
        let off = Theme::for_colors(false).progress.apply_to("x").to_string();
        assert_ne!(on, "x");
        assert_eq!(off, "x");
    }

    #[test]
    fn default_impl_matches_new() {
        let default = Theme::default();
        let new = Theme::new();
        assert_eq!(
            default.success.apply_to("ok").to_string(),
            new.success.apply_to("ok").to_string()
        );
    }
}
