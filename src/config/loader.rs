//! Task file discovery and loading.
//!
//! A task named `NAME` lives at `<tasks-dir>/NAME.yml` (or `NAME.yaml`).
//! Loading parses and validates the file, then builds a [`Task`] whose
//! steps run their commands through the user's shell.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::interpolation::resolve_string;
use crate::config::schema::{StepDef, TaskFile};
use crate::config::validator::validate_task;
use crate::error::{Result, TaskError};
use crate::runner::StepContext;
use crate::shell::{execute_streaming, CommandOptions};
use crate::tree::{Completion, Options, Step, Task};

/// Recognized task file extensions, in lookup order.
pub const TASK_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Longest info annotation taken from command output.
pub const INFO_WIDTH: usize = 72;

/// Path of the task file for `name` under `dir`.
///
/// Returns the first existing candidate, or the `.yml` path when none exists.
pub fn task_path(dir: &Path, name: &str) -> PathBuf {
    TASK_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", name, ext)))
        .find(|path| path.is_file())
        .unwrap_or_else(|| dir.join(format!("{}.{}", name, TASK_EXTENSIONS[0])))
}

/// Find and load the task `name` under `dir`.
pub fn find_task(dir: &Path, name: &str) -> Result<Task> {
    load_task(&task_path(dir, name))
}

/// Load a task file.
///
/// # Errors
///
/// `TaskNotFound` if the file does not exist, `InvalidTask` if it does not
/// parse or fails validation.
pub fn load_task(path: &Path) -> Result<Task> {
    if !path.is_file() {
        return Err(TaskError::TaskNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!("loading task file {}", path.display());
    let contents = fs::read_to_string(path)?;
    parse_task(path, &contents)
}

/// Parse task file contents. `path` is only used in error messages.
pub fn parse_task(path: &Path, contents: &str) -> Result<Task> {
    let file: TaskFile = serde_yaml::from_str(contents).map_err(|e| TaskError::InvalidTask {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let errors = validate_task(&file);
    if !errors.is_empty() {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(TaskError::InvalidTask {
            path: path.to_path_buf(),
            message,
        });
    }

    Ok(build_task(file))
}

/// Build a task from a parsed file. Nested tasks see the root's options.
pub fn build_task(file: TaskFile) -> Task {
    build_steps(file.steps, &file.options)
}

fn build_steps(defs: Vec<StepDef>, options: &Options) -> Task {
    defs.into_iter()
        .fold(Task::new(), |task, def| task.add(build_step(def, options)))
        .with_options(options.clone())
}

fn build_step(def: StepDef, options: &Options) -> Step {
    let mut step = match def.name {
        Some(name) => Step::named(name),
        None => Step::new(),
    };

    if let Some(message) = def.fail {
        step = step.run(move |ctx| {
            ctx.fail(message.as_str());
            Ok(())
        });
    } else if let Some(command) = def.run {
        let command = Arc::new(ShellCommand {
            command,
            save: def.save,
            env: def.env,
            cwd: def.cwd,
        });
        step = step.exec(move |ctx| command.start(ctx));
    }

    if def.concurrent {
        step = step.concurrent();
    }

    if let Some(children) = def.steps {
        step = step.with_child(build_steps(children, options));
    }

    step
}

/// The `run` body of a task-file step.
#[derive(Debug)]
struct ShellCommand {
    command: String,
    save: Option<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ShellCommand {
    /// Resolve variables now, then run the command as the step's tail.
    fn start(&self, ctx: StepContext) -> anyhow::Result<Completion> {
        let command = resolve_string(&self.command, &ctx)?;
        let env = self
            .env
            .iter()
            .map(|(key, value)| -> Result<(String, String)> {
                Ok((key.clone(), resolve_string(value, &ctx)?))
            })
            .collect::<Result<HashMap<_, _>>>()?;
        let options = CommandOptions {
            cwd: self.cwd.clone(),
            env,
        };
        let save = self.save.clone();

        Ok(Completion::pending(async move {
            debug!("running `{}`", command);
            let result = execute_streaming(&command, &options, |line| {
                let text = line.text().trim_end();
                if !text.is_empty() {
                    info!("{}", text);
                    ctx.info(truncate(text, INFO_WIDTH));
                }
            })
            .await?;

            if !result.success {
                return Err(TaskError::CommandFailed {
                    command,
                    code: result.exit_code,
                }
                .into());
            }

            if let Some(key) = save {
                ctx.set(key, result.stdout.trim());
            }

            Ok(())
        }))
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
