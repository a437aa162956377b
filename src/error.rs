//! Error types for taskline operations.
//!
//! This module defines [`TaskError`], the error type used by the engine,
//! the task-file loader and the CLI, and a [`Result`] type alias.
//!
//! # Error Handling Strategy
//!
//! - Step bodies return `anyhow::Result`; their errors are captured on the
//!   step as a [`Failure`](crate::tree::Failure) and never bubble up here
//! - Use `TaskError` for failures outside a step (loading, fatal uncaught)
//! - Use `anyhow::Error` (via `TaskError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for taskline operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// No task file exists for the requested task name.
    #[error("the task file path doesn't exist: {}", path.display())]
    TaskNotFound { path: PathBuf },

    /// The task file exists but does not describe a task.
    #[error("{} doesn't define a valid task: {message}", path.display())]
    InvalidTask { path: PathBuf, message: String },

    /// A `${name}` reference could not be resolved.
    #[error("Unknown variable: {name}")]
    UnknownVariable { name: String },

    /// Shell command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Shell command could not be started or waited on.
    #[error("Failed to run `{command}` in {}: {source}", cwd.display())]
    CommandIo {
        command: String,
        cwd: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An uncaught failure happened while no step was active.
    #[error("Uncaught failure outside of any step: {message}")]
    Unattributed { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for taskline operations.
pub type Result<T> = std::result::Result<T, TaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_not_found_displays_path() {
        let err = TaskError::TaskNotFound {
            path: PathBuf::from("tasks/deploy.yml"),
        };
        assert_eq!(
            err.to_string(),
            "the task file path doesn't exist: tasks/deploy.yml"
        );
    }

    #[test]
    fn invalid_task_displays_path_and_message() {
        let err = TaskError::InvalidTask {
            path: PathBuf::from("tasks/build.yml"),
            message: "missing field `steps`".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("tasks/build.yml"));
        assert!(msg.contains("missing field `steps`"));
    }

    #[test]
    fn unknown_variable_displays_name() {
        let err = TaskError::UnknownVariable {
            name: "version".into(),
        };
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = TaskError::CommandFailed {
            command: "npm install".into(),
            code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("npm install"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn command_io_displays_directory_and_cause() {
        let err = TaskError::CommandIo {
            command: "make".into(),
            cwd: PathBuf::from("build/out"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("`make`"));
        assert!(msg.contains("build/out"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn unattributed_displays_message() {
        let err = TaskError::Unattributed {
            message: "socket closed".into(),
        };
        assert!(err.to_string().contains("socket closed"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: TaskError = io_err.into();
        assert!(matches!(err, TaskError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(TaskError::UnknownVariable {
                name: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
