//! Terminal rendering of a running task tree.
//!
//! This module provides:
//! - [`Renderer`], which redraws the tree in place while steps run
//! - [`LogRouter`], a tracing writer whose output the renderer captures
//! - the glyphs, spinner and [`Theme`] used to draw step lines

pub mod capture;
pub mod icons;
pub mod renderer;
pub mod spinner;
pub mod theme;

pub use capture::{CaptureGuard, LogBuffer, LogRouter};
pub use renderer::{Renderer, RendererConfig, REDRAW_INTERVAL};
pub use spinner::Spinner;
pub use theme::{should_use_colors, Theme};
