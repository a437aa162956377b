//! Step execution orchestration.
//!
//! Non-concurrent siblings run strictly in order: a step starts only after
//! the previous one, including its whole child task, has finished. A
//! concurrent step lets the next sibling start as soon as its synchronous
//! phase is over. Once any failure has been recorded, no further step
//! starts.

pub mod context;
pub mod engine;

pub use context::StepContext;
pub use engine::{run, ExitSignal, RunOptions, RunResult, Runner};
