//! Shell command execution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Result, TaskError};

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with the process environment).
    pub env: HashMap<String, String>,
}

/// Output line from command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

impl OutputLine {
    /// Text of the line without its stream tag.
    pub fn text(&self) -> &str {
        match self {
            OutputLine::Stdout(line) | OutputLine::Stderr(line) => line,
        }
    }
}

/// Execute a command, handing every output line to `on_line` as it arrives.
///
/// Lines from stdout and stderr are delivered in arrival order. A non-zero
/// exit is reported through [`CommandResult::success`], not as an error.
pub async fn execute_streaming<F>(
    command: &str,
    options: &CommandOptions,
    mut on_line: F,
) -> Result<CommandResult>
where
    F: FnMut(OutputLine),
{
    let shell = detect_shell();
    let mut cmd = Command::new(&shell);
    cmd.arg(shell_flag()).arg(command);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let io_error = |source| TaskError::CommandIo {
        command: command.to_string(),
        cwd: options.cwd.clone().unwrap_or_else(|| Path::new(".").to_path_buf()),
        source,
    };

    let mut child = cmd.spawn().map_err(io_error)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let stdout_handle = spawn_reader(child.stdout.take(), tx.clone(), OutputLine::Stdout);
    let stderr_handle = spawn_reader(child.stderr.take(), tx, OutputLine::Stderr);

    while let Some(line) = rx.recv().await {
        on_line(line);
    }

    let stdout = stdout_handle.await.unwrap_or_default();
    let _ = stderr_handle.await;

    let status = child.wait().await.map_err(io_error)?;

    Ok(CommandResult {
        exit_code: status.code(),
        stdout,
        success: status.success(),
    })
}

fn spawn_reader<R>(
    reader: Option<R>,
    tx: mpsc::UnboundedSender<OutputLine>,
    tag: fn(String) -> OutputLine,
) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut output = String::new();
        let Some(reader) = reader else {
            return output;
        };
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            output.push_str(&line);
            output.push('\n');
            let _ = tx.send(tag(line));
        }
        output
    })
}

/// Detect the current shell.
pub fn detect_shell() -> String {
    if cfg!(target_os = "windows") {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    } else {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
}

/// Flag that makes the shell run its next argument as a command.
pub fn shell_flag() -> &'static str {
    if cfg!(target_os = "windows") {
        "/C"
    } else {
        "-c"
    }
}
