//! The task tree.
//!
//! This module provides the data model shared by the engine and the
//! renderer:
//!
//! - [`Task`] - An ordered sequence of steps with options and shared state
//! - [`Step`] - One node: a unit of work, a group wrapping a child task, or both
//! - [`StepStatus`] - The Initial → Running → Success/Failure state machine
//! - [`SharedState`] - Key/value store visible to every step of a run
//! - [`ParsedArgs`] - Trailing command-line arguments
//!
//! # Example
//!
//! ```
//! use taskline::tree::{Step, Task};
//!
//! let build = Task::new()
//!     .add(Step::named("compile").run(|_| Ok(())))
//!     .add(Step::named("link").run(|_| Ok(())));
//!
//! let task = Task::new()
//!     .add(Step::named("prepare").run(|ctx| {
//!         ctx.set("profile", "release");
//!         Ok(())
//!     }))
//!     .add(Step::named("build").with_child(build));
//!
//! assert_eq!(task.len(), 2);
//! ```

pub mod args;
pub mod state;
pub mod step;
pub mod task;

pub use args::ParsedArgs;
pub use state::SharedState;
pub use step::{Completion, ExecFn, Failure, Step, StepFuture, StepStatus};
pub use task::{Options, Task};
