//! Run command implementation.
//!
//! Loads the requested task file and executes it under the live renderer.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::find_task;
use crate::error::Result;
use crate::runner::{run, RunOptions, RunResult};
use crate::tree::ParsedArgs;
use crate::ui::{LogRouter, RendererConfig};

use super::args::Cli;

/// The run command implementation.
#[derive(Debug, Clone)]
pub struct RunCommand {
    tasks_dir: PathBuf,
    task: String,
    args: ParsedArgs,
    renderer: RendererConfig,
}

impl RunCommand {
    /// Create a run command from parsed CLI arguments.
    pub fn new(cli: &Cli) -> Self {
        Self {
            tasks_dir: cli.tasks_dir.clone(),
            task: cli.task.clone(),
            args: cli.parsed_args(),
            renderer: cli.renderer_config(),
        }
    }

    /// Directory task files are looked up in.
    pub fn tasks_dir(&self) -> &Path {
        &self.tasks_dir
    }

    /// Name of the task to run.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Load and execute the task.
    ///
    /// Log output goes through `router` into the renderer while it draws.
    /// Ctrl-C stops the run after a final draw with exit code 1.
    pub async fn execute(&self, router: LogRouter) -> Result<RunResult> {
        let task = find_task(&self.tasks_dir, &self.task)?;
        debug!(
            "running task {} ({} steps) with args {:?}",
            self.task,
            task.len(),
            self.args
        );

        let options = RunOptions {
            args: self.args.clone(),
            renderer: self.renderer,
            log_router: Some(router),
        };

        tokio::select! {
            result = run(&task, options) => result,
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted");
                Ok(RunResult { exit_code: 1 })
            }
        }
    }
}
