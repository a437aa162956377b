//! Command-line interface for taskline.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`run`] - Loading and running the requested task

pub mod args;
pub mod run;

pub use args::Cli;
pub use run::RunCommand;
