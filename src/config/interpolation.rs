//! Variable interpolation for task-file commands.
//!
//! Commands may reference values with `${variable}` syntax.
//!
//! # Syntax
//!
//! - `${variable_name}` - replaced with variable value
//! - `$${escaped}` - produces literal `${escaped}` in output
//!
//! # Example
//!
//! ```yaml
//! run: "echo Deploying to ${region}"
//! # With region="eu", produces: echo Deploying to eu
//! ```

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::error::{Result, TaskError};
use crate::runner::StepContext;

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Parse a string containing ${var} interpolations.
///
/// An unterminated `${` is kept as literal text.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut current_literal = String::new();

    while let Some(c) = chars.next() {
        if c != '$' {
            current_literal.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                if chars.peek() == Some(&'{') {
                    // $${...} -> literal ${...}
                    chars.next();
                    current_literal.push_str("${");
                    for c in chars.by_ref() {
                        current_literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                } else {
                    current_literal.push('$');
                }
            }
            Some('{') => {
                chars.next();

                let mut var_name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    var_name.push(c);
                }

                if closed {
                    if !current_literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut current_literal)));
                    }
                    segments.push(Segment::Variable(var_name.trim().to_string()));
                } else {
                    current_literal.push_str("${");
                    current_literal.push_str(&var_name);
                }
            }
            _ => current_literal.push(c),
        }
    }

    if !current_literal.is_empty() {
        segments.push(Segment::Literal(current_literal));
    }

    segments
}

/// Extract all variable names from an interpolated string.
pub fn extract_variables(input: &str) -> HashSet<String> {
    parse_interpolation(input)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Variable(name) => Some(name),
            _ => None,
        })
        .collect()
}

/// Something variables can be looked up in.
pub trait VariableSource {
    /// Value of `name`, rendered as text.
    fn resolve(&self, name: &str) -> Option<String>;
}

impl VariableSource for HashMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Variables visible to a step: the shared state store first, then the
/// task's options, then the trailing-argument flags.
impl VariableSource for StepContext {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name)
            .or_else(|| self.option(name).cloned())
            .or_else(|| self.args().flag(name).cloned())
            .map(|value| value_to_string(&value))
    }
}

/// Render a value the way it should appear inside a shell command.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

/// Resolve all variables in an interpolated string.
///
/// # Errors
///
/// Returns `UnknownVariable` for the first variable the source cannot resolve.
pub fn resolve_string(input: &str, source: &impl VariableSource) -> Result<String> {
    let mut result = String::new();

    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value = source
                    .resolve(&name)
                    .ok_or(TaskError::UnknownVariable { name })?;
                result.push_str(&value);
            }
        }
    }

    Ok(result)
}
