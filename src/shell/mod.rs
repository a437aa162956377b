//! Shell command execution.

pub mod command;

pub use command::{
    detect_shell, execute_streaming, shell_flag, CommandOptions, CommandResult, OutputLine,
};
