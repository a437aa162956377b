//! Status glyphs for step lines.

use crate::tree::StepStatus;

use super::theme::Theme;

/// Glyph for a successful step.
pub const TICK: &str = "✓";
/// Glyph for a failed step.
pub const CROSS: &str = "✗";
/// Static glyph for a running step when animation is off.
pub const PLAY: &str = "▶";
/// Separator between a step name and its annotation.
pub const ARROW: &str = "→";
/// Placeholder for a step that has not started.
pub const BLANK: &str = " ";

/// Unstyled glyph for a status. `running` is the glyph used for running
/// steps (a spinner frame or [`PLAY`]).
pub fn glyph(status: StepStatus, running: &str) -> &str {
    match status {
        StepStatus::Initial => BLANK,
        StepStatus::Running => running,
        StepStatus::Success => TICK,
        StepStatus::Failure => CROSS,
    }
}

/// Styled glyph for a status.
pub fn styled(status: StepStatus, running: &str, theme: &Theme) -> String {
    let icon = glyph(status, running);
    match status {
        StepStatus::Initial => icon.to_string(),
        StepStatus::Running => theme.progress.apply_to(icon).to_string(),
        StepStatus::Success => theme.success.apply_to(icon).to_string(),
        StepStatus::Failure => theme.failure.apply_to(icon).to_string(),
    }
}
