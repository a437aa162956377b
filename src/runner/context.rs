//! The state handle handed to step bodies.

use std::future::Future;
use std::sync::Arc;

use anyhow::anyhow;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::tree::{Failure, Options, ParsedArgs, Step};

use super::engine::{panic_message, Runner};

/// Handle a step body uses to reach the run: arguments, options, the
/// shared state store, and info/fail signaling for its own step.
#[derive(Clone)]
pub struct StepContext {
    runner: Runner,
    step: Arc<Step>,
    options: Arc<Options>,
}

impl StepContext {
    pub(crate) fn new(runner: Runner, step: Arc<Step>, options: Arc<Options>) -> Self {
        Self {
            runner,
            step,
            options,
        }
    }

    /// Trailing command-line arguments.
    pub fn args(&self) -> &ParsedArgs {
        self.runner.args()
    }

    /// Options of the task this step belongs to.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// A single option.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Read from the shared state store.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.runner.state().get(key)
    }

    /// Read and deserialize from the shared state store.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.runner.state().get_as(key)
    }

    /// Write to the shared state store.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.runner.state().set(key, value);
    }

    /// Annotate this step without changing its status.
    pub fn info(&self, message: impl Into<String>) {
        self.step.set_info(message);
    }

    /// Mark this step failed and set the run's exit signal.
    ///
    /// The engine stops at this step once its body returns.
    pub fn fail(&self, failure: impl Into<Failure>) {
        self.runner.fail_step(&self.step, failure.into());
    }

    /// Name of the step this handle belongs to.
    pub fn step_name(&self) -> Option<&str> {
        self.step.name()
    }

    /// Run detached background work.
    ///
    /// The work is not part of this step's result: an error or panic is an
    /// uncaught failure, attributed to whichever step is active when it
    /// happens. The run waits for the work before finishing.
    pub fn spawn<F>(&self, work: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let runner = self.runner.clone();
        let handle = tokio::spawn(async move {
            match tokio::spawn(work).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => runner.report_uncaught(err),
                Err(err) if err.is_panic() => {
                    runner.report_uncaught(anyhow!(panic_message(err.into_panic())))
                }
                Err(_) => {}
            }
        });
        self.runner.track(handle);
    }
}

impl std::fmt::Debug for StepContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepContext")
            .field("step", &self.step.name())
            .field("options", &self.options)
            .finish()
    }
}
