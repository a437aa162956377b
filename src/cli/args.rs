//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::tree::ParsedArgs;
use crate::ui::RendererConfig;

/// Taskline - run a task file and draw its progress tree.
#[derive(Debug, Parser)]
#[command(name = "taskline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Task to run; resolves to <TASKS_DIR>/<TASK>.yml
    pub task: String,

    /// Directory holding task files
    #[arg(long, env = "TASKLINE_TASKS_DIR", default_value = "tasks")]
    pub tasks_dir: PathBuf,

    /// Draw the progress tree [default: true]
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub print: Option<bool>,

    /// Color the progress tree [default: stdout is a terminal]
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub colors: Option<bool>,

    /// Animate running steps [default: stdout is a terminal]
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub animate: Option<bool>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Arguments handed to the task's steps
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

impl Cli {
    /// Renderer configuration: explicit flags over terminal detection.
    pub fn renderer_config(&self) -> RendererConfig {
        let detected = RendererConfig::default();
        RendererConfig {
            print: self.print.unwrap_or(detected.print),
            colors: self.colors.unwrap_or(detected.colors),
            animate: self.animate.unwrap_or(detected.animate),
        }
    }

    /// Trailing arguments, parsed into flags and positionals.
    pub fn parsed_args(&self) -> ParsedArgs {
        ParsedArgs::parse(&self.args)
    }
}
