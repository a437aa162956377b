//! Spinner animation for running steps.

use std::time::{Duration, Instant};

/// Spinner frames, in order.
pub const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Minimum wall-clock time between two frames.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Spinner whose frame advances with elapsed time rather than with draws.
#[derive(Debug, Clone)]
pub struct Spinner {
    index: usize,
    last_advance: Instant,
}

impl Spinner {
    /// Create a spinner showing its first frame.
    pub fn new(now: Instant) -> Self {
        Self {
            index: 0,
            last_advance: now,
        }
    }

    /// Advance one frame if [`FRAME_INTERVAL`] elapsed since the last advance.
    pub fn tick(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_advance) >= FRAME_INTERVAL {
            self.index = (self.index + 1) % FRAMES.len();
            self.last_advance = now;
        }
    }

    /// Current frame.
    pub fn frame(&self) -> &'static str {
        FRAMES[self.index]
    }
}
