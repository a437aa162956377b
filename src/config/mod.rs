//! Task file loading, parsing, and validation.
//!
//! This module handles everything between a task name on the command line
//! and a runnable [`Task`](crate::tree::Task):
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//! - Variable interpolation in [`interpolation`]
//!
//! # Example
//!
//! ```
//! use taskline::config::find_task;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(
//!     temp.path().join("build.yml"),
//!     "steps:\n  - name: compile\n  - name: link\n",
//! )
//! .unwrap();
//!
//! let task = find_task(temp.path(), "build").unwrap();
//! assert_eq!(task.len(), 2);
//! ```

pub mod interpolation;
pub mod loader;
pub mod schema;
pub mod validator;

pub use interpolation::{
    extract_variables, parse_interpolation, resolve_string, Segment, VariableSource,
};
pub use loader::{build_task, find_task, load_task, parse_task, task_path};
pub use schema::{StepDef, TaskFile};
pub use validator::{validate_task, ValidationError};

#[cfg(test)]
mod tests {
    #[test]
    fn serde_yaml_values_convert_to_json() {
        let yaml = "name: test\nvalue: 42\nnested:\n  flag: true";
        let parsed: serde_json::Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed["name"], "test");
        assert_eq!(parsed["value"], 42);
        assert_eq!(parsed["nested"]["flag"], true);
    }
}
