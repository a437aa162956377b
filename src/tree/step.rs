//! Steps and their status state machine.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use parking_lot::Mutex;

use crate::runner::StepContext;

use super::task::Task;

/// The asynchronous tail of a step body.
pub type StepFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// Signature of a step body: a synchronous phase that either completes the
/// work or hands back a future for the engine to settle.
pub type ExecFn = dyn Fn(StepContext) -> anyhow::Result<Completion> + Send + Sync;

/// What the synchronous phase of a step body produced.
pub enum Completion {
    /// The work finished synchronously.
    Ready,
    /// The work continues asynchronously.
    Pending(StepFuture),
}

impl Completion {
    /// Wrap a future as the pending tail of a step.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("Ready"),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Status of a step in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StepStatus {
    /// Step has not started.
    #[default]
    Initial,

    /// Step is executing, or its child task is.
    Running,

    /// Step and its whole subtree finished successfully.
    Success,

    /// Step failed.
    Failure,
}

impl StepStatus {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Failure)
    }

    /// Check if a step in this state can still receive failures.
    pub fn is_active(&self) -> bool {
        matches!(self, StepStatus::Running | StepStatus::Failure)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Initial => "initial",
            StepStatus::Running => "running",
            StepStatus::Success => "success",
            StepStatus::Failure => "failure",
        };
        write!(f, "{}", s)
    }
}

/// Failure payload recorded on a step.
#[derive(Debug)]
pub enum Failure {
    /// Failure without detail (e.g. a child task failed).
    None,
    /// Declared failure with a human message.
    Message(String),
    /// Structured error, kept for the detailed error dump.
    Error(anyhow::Error),
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Self::Error(err)
    }
}

#[derive(Debug, Default)]
struct StepState {
    status: StepStatus,
    info: Option<String>,
    error: Option<anyhow::Error>,
    error_message: Option<String>,
}

/// A node of the execution tree.
///
/// Unnamed steps are not drawn but still execute and still fail.
pub struct Step {
    name: Option<String>,
    exec: Option<Box<ExecFn>>,
    child: Option<Task>,
    concurrent: bool,
    state: Mutex<StepState>,
}

impl Default for Step {
    fn default() -> Self {
        Self::new()
    }
}

impl Step {
    /// Create an unnamed step with no work.
    pub fn new() -> Self {
        Self {
            name: None,
            exec: None,
            child: None,
            concurrent: false,
            state: Mutex::new(StepState::default()),
        }
    }

    /// Create a named step with no work.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }

    /// Set a synchronous body.
    pub fn run<F>(self, body: F) -> Self
    where
        F: Fn(&StepContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.exec(move |ctx| {
            body(&ctx)?;
            Ok(Completion::Ready)
        })
    }

    /// Set an asynchronous body.
    pub fn run_async<F, Fut>(self, body: F) -> Self
    where
        F: Fn(StepContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.exec(move |ctx| Ok(Completion::pending(body(ctx))))
    }

    /// Set a body with an explicit synchronous phase.
    ///
    /// An `Err` from the synchronous phase fails the step before any
    /// concurrency applies.
    pub fn exec<F>(mut self, body: F) -> Self
    where
        F: Fn(StepContext) -> anyhow::Result<Completion> + Send + Sync + 'static,
    {
        self.exec = Some(Box::new(body));
        self
    }

    /// Nest a task that runs after this step's body resolves.
    pub fn with_child(mut self, task: Task) -> Self {
        self.child = Some(task);
        self
    }

    /// Do not wait for this step's asynchronous tail before starting the
    /// next sibling.
    pub fn concurrent(mut self) -> Self {
        self.concurrent = true;
        self
    }

    /// Display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Nested task, if any.
    pub fn child(&self) -> Option<&Task> {
        self.child.as_ref()
    }

    /// Whether siblings may start before this step settles.
    pub fn is_concurrent(&self) -> bool {
        self.concurrent
    }

    pub(crate) fn body(&self) -> Option<&ExecFn> {
        self.exec.as_deref()
    }

    /// Current status.
    pub fn status(&self) -> StepStatus {
        self.state.lock().status
    }

    /// Current progress annotation.
    pub fn info(&self) -> Option<String> {
        self.state.lock().info.clone()
    }

    /// Short failure message, if any.
    pub fn error_message(&self) -> Option<String> {
        self.state.lock().error_message.clone()
    }

    /// Whether a structured error was captured.
    pub fn has_error(&self) -> bool {
        self.state.lock().error.is_some()
    }

    /// Detailed representation of the captured error, including its causes.
    pub fn error_report(&self) -> Option<String> {
        self.state.lock().error.as_ref().map(|err| format!("{:?}", err))
    }

    /// Set the progress annotation.
    pub fn set_info(&self, message: impl Into<String>) {
        self.state.lock().info = Some(message.into());
    }

    /// Initial → Running. Returns false if the step already started.
    pub(crate) fn start(&self) -> bool {
        let mut state = self.state.lock();
        if state.status != StepStatus::Initial {
            return false;
        }
        state.status = StepStatus::Running;
        true
    }

    /// Running → Success. A failed step stays failed.
    pub(crate) fn succeed(&self) -> bool {
        let mut state = self.state.lock();
        if state.status != StepStatus::Running {
            return false;
        }
        state.status = StepStatus::Success;
        true
    }

    /// Running|Failure → Failure, recording the payload.
    ///
    /// A step that already failed accepts later failures, which replace the
    /// recorded detail.
    pub(crate) fn fail(&self, failure: Failure) -> bool {
        let mut state = self.state.lock();
        if !state.status.is_active() {
            return false;
        }
        state.status = StepStatus::Failure;
        match failure {
            Failure::None => {}
            Failure::Message(message) => state.error_message = Some(message),
            Failure::Error(err) => {
                state.error_message = Some(err.to_string());
                state.error = Some(err);
            }
        }
        true
    }
}

impl From<Task> for Step {
    fn from(task: Task) -> Self {
        Step::new().with_child(task)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("status", &self.status())
            .field("concurrent", &self.concurrent)
            .field("has_exec", &self.exec.is_some())
            .field("child", &self.child)
            .finish()
    }
}
