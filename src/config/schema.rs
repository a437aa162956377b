//! Task file schema.
//!
//! These structs map to the YAML format of `<tasks-dir>/NAME.yml`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::tree::Options;

/// Root structure of a task file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskFile {
    /// Options handed to every step body of the task.
    #[serde(skip_serializing_if = "Options::is_empty")]
    pub options: Options,

    /// Steps, in execution order.
    pub steps: Vec<StepDef>,
}

/// One step of a task file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepDef {
    /// Label drawn in the tree. Unnamed steps run but are not drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Shell command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    /// Start the next sibling without waiting for this step.
    #[serde(skip_serializing_if = "is_false")]
    pub concurrent: bool,

    /// State key receiving the command's trimmed stdout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<String>,

    /// Declares the step failed with this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,

    /// Extra environment variables for the command.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Working directory for the command, relative to the current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Nested steps, run after this step's own command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepDef>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}
