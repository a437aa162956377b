//! Task file validation rules.
//!
//! Shape errors (wrong types, unknown fields) are caught while parsing.
//! This module checks what the types cannot express:
//! - A step must define at least one of `name`, `run`, `fail` or `steps`
//! - `run` and `fail` are mutually exclusive
//! - `save`, `env` and `cwd` only apply to a step with `run`

use std::fmt;

use crate::config::schema::{StepDef, TaskFile};

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: &'static str,
    /// Location of the step, e.g. `steps[1].steps[0]`
    pub location: String,
    /// Human-readable error message
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Validate a task file and return all errors.
///
/// All errors are collected rather than stopping at the first one.
pub fn validate_task(file: &TaskFile) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_steps(&file.steps, "steps", &mut errors);
    errors
}

fn validate_steps(steps: &[StepDef], prefix: &str, errors: &mut Vec<ValidationError>) {
    for (index, step) in steps.iter().enumerate() {
        let location = format!("{}[{}]", prefix, index);

        if step.name.is_none() && step.run.is_none() && step.fail.is_none() && step.steps.is_none()
        {
            errors.push(ValidationError {
                rule: "empty-step",
                location: location.clone(),
                message: "a step needs at least one of 'name', 'run', 'fail' or 'steps'"
                    .to_string(),
            });
        }

        if step.run.is_some() && step.fail.is_some() {
            errors.push(ValidationError {
                rule: "run-and-fail",
                location: location.clone(),
                message: "'run' and 'fail' cannot be combined".to_string(),
            });
        }

        if step.run.is_none() {
            for (field, present) in [
                ("save", step.save.is_some()),
                ("env", !step.env.is_empty()),
                ("cwd", step.cwd.is_some()),
            ] {
                if present {
                    errors.push(ValidationError {
                        rule: "requires-run",
                        location: location.clone(),
                        message: format!("'{}' requires 'run'", field),
                    });
                }
            }
        }

        if let Some(children) = &step.steps {
            validate_steps(children, &format!("{}.steps", location), errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> TaskFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn valid_task_has_no_errors() {
        let file = parse(
            r#"
steps:
  - name: build
    run: make
    save: output
  - name: group
    steps:
      - fail: not yet
"#,
        );
        assert!(validate_task(&file).is_empty());
    }

    #[test]
    fn empty_step_is_rejected() {
        let file = parse("steps:\n  - concurrent: true\n");
        let errors = validate_task(&file);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule, "empty-step");
        assert_eq!(errors[0].location, "steps[0]");
    }

    #[test]
    fn run_and_fail_conflict() {
        let file = parse("steps:\n  - run: make\n    fail: nope\n");
        let errors = validate_task(&file);
        assert!(errors.iter().any(|e| e.rule == "run-and-fail"));
    }

    #[test]
    fn save_requires_run() {
        let file = parse("steps:\n  - name: a\n    save: out\n");
        let errors = validate_task(&file);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "'save' requires 'run'");
    }

    #[test]
    fn nested_errors_report_location() {
        let file = parse("steps:\n  - name: a\n  - name: b\n    steps:\n      - {}\n");
        let errors = validate_task(&file);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].location, "steps[1].steps[0]");
        assert!(errors[0].to_string().starts_with("steps[1].steps[0]: "));
    }

    #[test]
    fn collects_all_errors() {
        let file = parse("steps:\n  - {}\n  - run: a\n    fail: b\n");
        assert_eq!(validate_task(&file).len(), 2);
    }
}
