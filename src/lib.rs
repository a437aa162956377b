//! Taskline - hierarchical task runner with a live terminal progress tree.
//!
//! A task is an ordered tree of named steps. The engine runs the steps in
//! order (or overlapped, for concurrent steps), records every status change
//! and failure on the step it belongs to, and a renderer redraws the tree in
//! place while it runs.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - YAML task files: schema, loading, validation, interpolation
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Step execution engine and the step context
//! - [`shell`] - Shell command execution
//! - [`tree`] - Tasks, steps, statuses and shared state
//! - [`ui`] - Live rendering, glyphs, theme and log capture
//!
//! # Example
//!
//! ```
//! use taskline::runner::{run, RunOptions};
//! use taskline::tree::{Step, Task};
//! use taskline::ui::RendererConfig;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let task = Task::new()
//!     .add(Step::named("fetch").run(|ctx| {
//!         ctx.set("count", 3);
//!         Ok(())
//!     }))
//!     .add(Step::named("report").run(|ctx| {
//!         ctx.info(format!("{} items", ctx.get_as::<u32>("count").unwrap_or(0)));
//!         Ok(())
//!     }));
//!
//! let options = RunOptions {
//!     renderer: RendererConfig::silent(),
//!     ..Default::default()
//! };
//! let result = run(&task, options).await.unwrap();
//! assert_eq!(result.exit_code, 0);
//! # });
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod shell;
pub mod tree;
pub mod ui;

pub use error::{Result, TaskError};
pub use runner::{run, RunOptions, RunResult, StepContext};
pub use tree::{Failure, Step, StepStatus, Task};
