//! Ordered step sequences.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::state::SharedState;
use super::step::Step;

/// Options bag attached to a task and handed to its steps.
pub type Options = serde_json::Map<String, Value>;

/// An ordered sequence of steps plus the options and shared state its
/// steps see.
///
/// Cloning a task, or configuring it with [`Task::with_options`], yields a
/// handle onto the same step sequence and the same state store.
#[derive(Clone, Default)]
pub struct Task {
    steps: Arc<RwLock<Vec<Arc<Step>>>>,
    options: Arc<Options>,
    state: SharedState,
}

impl Task {
    /// Create an empty task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. A [`Task`] is accepted too and becomes an unnamed group.
    pub fn add(self, step: impl Into<Step>) -> Self {
        self.steps.write().push(Arc::new(step.into()));
        self
    }

    /// Produce a task sharing this task's steps and state with different options.
    pub fn with_options(&self, options: Options) -> Self {
        Self {
            steps: Arc::clone(&self.steps),
            options: Arc::new(options),
            state: self.state.clone(),
        }
    }

    /// Snapshot of the steps, in execution order.
    pub fn steps(&self) -> Vec<Arc<Step>> {
        self.steps.read().clone()
    }

    /// Number of direct steps.
    pub fn len(&self) -> usize {
        self.steps.read().len()
    }

    /// Whether the task has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.read().is_empty()
    }

    /// Options handed to this task's steps.
    pub fn options(&self) -> &Arc<Options> {
        &self.options
    }

    /// The shared key/value store.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Best guess at the step currently doing work.
    ///
    /// Searches steps last-to-first, descending into the children of any
    /// running or failed step, and returns the deepest running or failed
    /// step found first. With several concurrent steps in flight this picks
    /// the most recently added one, which is not necessarily the cause.
    pub fn active_step(&self) -> Option<Arc<Step>> {
        for step in self.steps().into_iter().rev() {
            if !step.status().is_active() {
                continue;
            }
            if let Some(nested) = step.child().and_then(Task::active_step) {
                return Some(nested);
            }
            return Some(step);
        }
        None
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("steps", &self.steps.read())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Failure;
    use serde_json::json;

    fn options(pairs: &[(&str, Value)]) -> Options {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn add_preserves_order() {
        let task = Task::new()
            .add(Step::named("a"))
            .add(Step::named("b"))
            .add(Step::named("c"));
        let names: Vec<_> = task
            .steps()
            .iter()
            .map(|s| s.name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn add_task_wraps_in_unnamed_step() {
        let child = Task::new().add(Step::named("inner"));
        let task = Task::new().add(child);
        let steps = task.steps();
        assert_eq!(steps.len(), 1);
        assert!(steps[0].name().is_none());
        assert_eq!(steps[0].child().unwrap().len(), 1);
    }

    #[test]
    fn with_options_is_copy_on_configure() {
        let base = Task::new().add(Step::named("a"));
        let configured = base.with_options(options(&[("env", json!("prod"))]));

        assert!(base.options().is_empty());
        assert_eq!(configured.options().get("env"), Some(&json!("prod")));
    }

    #[test]
    fn with_options_shares_steps_and_state() {
        let base = Task::new().add(Step::named("a"));
        let configured = base.with_options(Options::new());

        base.clone().add(Step::named("b"));
        assert_eq!(configured.len(), 2);

        configured.state().set("key", 1);
        assert_eq!(base.state().get("key"), Some(json!(1)));
    }

    #[test]
    fn empty_task() {
        let task = Task::new();
        assert!(task.is_empty());
        assert_eq!(task.len(), 0);
        assert!(task.active_step().is_none());
    }

    #[test]
    fn active_step_ignores_idle_steps() {
        let task = Task::new().add(Step::named("a")).add(Step::named("b"));
        let steps = task.steps();
        steps[0].start();
        steps[0].succeed();
        assert!(task.active_step().is_none());
    }

    #[test]
    fn active_step_prefers_latest_sibling() {
        let task = Task::new().add(Step::named("a")).add(Step::named("b"));
        let steps = task.steps();
        steps[0].start();
        steps[1].start();
        assert_eq!(task.active_step().unwrap().name(), Some("b"));
    }

    #[test]
    fn active_step_descends_into_children() {
        let child = Task::new().add(Step::named("inner"));
        let task = Task::new().add(Step::named("outer").with_child(child.clone()));
        task.steps()[0].start();
        assert_eq!(task.active_step().unwrap().name(), Some("outer"));

        child.steps()[0].start();
        assert_eq!(task.active_step().unwrap().name(), Some("inner"));
    }

    #[test]
    fn active_step_finds_failed_steps() {
        let task = Task::new().add(Step::named("a")).add(Step::named("b"));
        let steps = task.steps();
        steps[0].start();
        steps[0].fail(Failure::from("boom"));
        assert_eq!(task.active_step().unwrap().name(), Some("a"));
    }

    #[test]
    fn debug_lists_steps() {
        let task = Task::new().add(Step::named("a"));
        let debug = format!("{:?}", task);
        assert!(debug.contains("\"a\""));
    }
}
