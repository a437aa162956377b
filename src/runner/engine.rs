//! Step execution engine.
//!
//! Walks a task tree in insertion order, runs each step body, settles its
//! asynchronous tail, recurses into child tasks and records failures on the
//! step they belong to.

use std::any::Any;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::{Result, TaskError};
use crate::tree::{
    Completion, Failure, Options, ParsedArgs, SharedState, Step, StepFuture, StepStatus, Task,
};
use crate::ui::{LogRouter, Renderer, RendererConfig};

use super::context::StepContext;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Marker returned when a step did not succeed; the failure itself is
/// recorded on the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Halted;

/// Background tail of a concurrent step.
type Tail = JoinHandle<std::result::Result<(), Halted>>;

/// Process exit signal shared by everything in a run.
#[derive(Debug, Clone, Default)]
pub struct ExitSignal(Arc<AtomicI32>);

impl ExitSignal {
    /// Record that the run failed.
    pub fn fail(&self) {
        self.0.store(1, Ordering::SeqCst);
    }

    /// Current exit code.
    pub fn code(&self) -> i32 {
        self.0.load(Ordering::SeqCst)
    }

    /// Whether a failure was recorded.
    pub fn is_failed(&self) -> bool {
        self.code() != 0
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// 0 on full success, 1 once any failure was observed.
    pub exit_code: i32,
}

impl RunResult {
    /// Whether every step succeeded.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Options for [`run`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Trailing arguments handed to step bodies.
    pub args: ParsedArgs,
    /// Renderer configuration.
    pub renderer: RendererConfig,
    /// Log router whose output the renderer captures while it draws.
    pub log_router: Option<LogRouter>,
}

/// Draw `task` on stdout while executing it.
///
/// Starts the renderer, runs every step, then performs the final draw.
pub async fn run(task: &Task, options: RunOptions) -> Result<RunResult> {
    let mut renderer = Renderer::new(task, options.renderer);
    if let Some(router) = &options.log_router {
        renderer.capture_logs(router);
    }
    renderer.start();

    let result = Runner::new(task, options.args).execute().await;

    renderer.finish();
    result
}

struct Inner {
    root: Task,
    args: ParsedArgs,
    state: SharedState,
    exit: ExitSignal,
    background: Mutex<Vec<JoinHandle<()>>>,
    fatal: Mutex<Option<anyhow::Error>>,
}

/// Executes a task tree.
///
/// Cloning is cheap; clones drive the same run.
#[derive(Clone)]
pub struct Runner {
    inner: Arc<Inner>,
}

impl Runner {
    /// Prepare a run of `root`. Every step shares the root's state store.
    pub fn new(root: &Task, args: ParsedArgs) -> Self {
        Self {
            inner: Arc::new(Inner {
                root: root.clone(),
                args,
                state: root.state().clone(),
                exit: ExitSignal::default(),
                background: Mutex::new(Vec::new()),
                fatal: Mutex::new(None),
            }),
        }
    }

    /// The root task.
    pub fn root(&self) -> &Task {
        &self.inner.root
    }

    /// Trailing arguments of this run.
    pub fn args(&self) -> &ParsedArgs {
        &self.inner.args
    }

    /// State store of this run.
    pub fn state(&self) -> &SharedState {
        &self.inner.state
    }

    /// Current exit code.
    pub fn exit_code(&self) -> i32 {
        self.inner.exit.code()
    }

    /// Run every step of the root task, then wait for outstanding concurrent
    /// tails and background work.
    ///
    /// Returns `Err(TaskError::Unattributed)` if a failure occurred while no
    /// step was active.
    pub async fn execute(&self) -> Result<RunResult> {
        let outcome = self.clone().execute_steps(self.inner.root.clone()).await;
        self.drain().await;

        if outcome.is_err() {
            self.inner.exit.fail();
        }

        if let Some(err) = self.inner.fatal.lock().take() {
            return Err(TaskError::Unattributed {
                message: format!("{:#}", err),
            });
        }

        Ok(RunResult {
            exit_code: self.exit_code(),
        })
    }

    /// Route a failure that no step funneled through its own result.
    ///
    /// The failure goes to [`Task::active_step`]; with no active step it is
    /// fatal for the run. Either way the exit signal is set.
    pub fn report_uncaught(&self, err: anyhow::Error) {
        self.inner.exit.fail();
        match self.inner.root.active_step() {
            Some(step) => {
                warn!(
                    "attributing uncaught failure to step {}: {:#}",
                    step.name().unwrap_or("<unnamed>"),
                    err
                );
                step.fail(Failure::Error(err));
            }
            None => {
                error!("uncaught failure outside of any step: {:#}", err);
                self.inner.fatal.lock().get_or_insert(err);
            }
        }
    }

    pub(crate) fn fail_step(&self, step: &Step, failure: Failure) {
        debug!(
            "step {} failed: {:?}",
            step.name().unwrap_or("<unnamed>"),
            failure
        );
        step.fail(failure);
        self.inner.exit.fail();
    }

    pub(crate) fn track(&self, handle: JoinHandle<()>) {
        self.inner.background.lock().push(handle);
    }

    async fn drain(&self) {
        loop {
            let handles = std::mem::take(&mut *self.inner.background.lock());
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    if err.is_panic() {
                        self.report_uncaught(anyhow!(panic_message(err.into_panic())));
                    }
                }
            }
        }
    }

    /// Run `task`'s steps in order, then wait for the concurrent tails they
    /// left behind.
    ///
    /// Fails if any step of `task` ended in failure, including a concurrent
    /// step whose tail failed after its later siblings were started.
    fn execute_steps(self, task: Task) -> BoxFuture<std::result::Result<(), Halted>> {
        Box::pin(async move {
            let options = Arc::clone(task.options());
            let mut tails = Vec::new();
            let mut outcome = Ok(());
            for step in task.steps() {
                if self.inner.exit.is_failed() {
                    outcome = Err(Halted);
                    break;
                }
                match self.clone().execute_step(step, Arc::clone(&options)).await {
                    Ok(Some(tail)) => tails.push(tail),
                    Ok(None) => {}
                    Err(halted) => {
                        outcome = Err(halted);
                        break;
                    }
                }
            }

            if outcome.is_err() {
                // already failed; leftover tails finish before the run returns
                for tail in tails {
                    self.track(tokio::spawn(async move {
                        let _ = tail.await;
                    }));
                }
                return outcome;
            }

            for tail in tails {
                match tail.await {
                    Ok(Ok(())) => {}
                    Ok(Err(halted)) => outcome = Err(halted),
                    Err(err) => {
                        if err.is_panic() {
                            self.report_uncaught(anyhow!(panic_message(err.into_panic())));
                        }
                        outcome = Err(Halted);
                    }
                }
            }

            if task
                .steps()
                .iter()
                .any(|step| step.status() == StepStatus::Failure)
            {
                outcome = Err(Halted);
            }
            outcome
        })
    }

    /// Run one step. A concurrent step returns its tail once its synchronous
    /// phase is done; everything else is settled before returning.
    async fn execute_step(
        self,
        step: Arc<Step>,
        options: Arc<Options>,
    ) -> std::result::Result<Option<Tail>, Halted> {
        step.start();
        debug!("step {} started", step.name().unwrap_or("<unnamed>"));

        let mut pending = None;
        if let Some(body) = step.body() {
            let ctx = StepContext::new(self.clone(), Arc::clone(&step), options);
            match catch_unwind(AssertUnwindSafe(|| body(ctx))) {
                Ok(Ok(Completion::Ready)) => {}
                Ok(Ok(Completion::Pending(future))) => pending = Some(future),
                Ok(Err(err)) => {
                    self.fail_step(&step, Failure::Error(err));
                    return Err(Halted);
                }
                Err(payload) => {
                    self.fail_step(&step, Failure::Error(anyhow!(panic_message(payload))));
                    return Err(Halted);
                }
            }
        }

        if step.status() == StepStatus::Failure {
            return Err(Halted);
        }

        if step.is_concurrent() {
            return Ok(Some(tokio::spawn(self.clone().settle(step, pending))));
        }

        self.settle(step, pending).await.map(|()| None)
    }

    /// Await the step's pending future, run its child task, then mark it
    /// successful.
    async fn settle(
        self,
        step: Arc<Step>,
        pending: Option<StepFuture>,
    ) -> std::result::Result<(), Halted> {
        if let Some(future) = pending {
            match tokio::spawn(future).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    self.fail_step(&step, Failure::Error(err));
                    return Err(Halted);
                }
                Err(err) => {
                    let failure = if err.is_panic() {
                        anyhow!(panic_message(err.into_panic()))
                    } else {
                        anyhow!("step was cancelled")
                    };
                    self.fail_step(&step, Failure::Error(failure));
                    return Err(Halted);
                }
            }
        }

        if step.status() == StepStatus::Failure {
            return Err(Halted);
        }

        if let Some(child) = step.child() {
            if self.clone().execute_steps(child.clone()).await.is_err() {
                self.fail_step(&step, Failure::None);
                return Err(Halted);
            }
        }

        if step.succeed() {
            debug!("step {} succeeded", step.name().unwrap_or("<unnamed>"));
            Ok(())
        } else {
            Err(Halted)
        }
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_signal_starts_clear() {
        let signal = ExitSignal::default();
        assert_eq!(signal.code(), 0);
        assert!(!signal.is_failed());
    }

    #[test]
    fn exit_signal_is_shared() {
        let signal = ExitSignal::default();
        let clone = signal.clone();
        clone.fail();
        assert_eq!(signal.code(), 1);
    }

    #[test]
    fn run_result_success() {
        assert!(RunResult { exit_code: 0 }.success());
        assert!(!RunResult { exit_code: 1 }.success());
    }

    #[test]
    fn panic_message_from_str_and_string() {
        assert_eq!(panic_message(Box::new("oops")), "panicked: oops");
        assert_eq!(
            panic_message(Box::new(String::from("bad state"))),
            "panicked: bad state"
        );
        assert_eq!(panic_message(Box::new(42)), "panicked");
    }

    #[tokio::test]
    async fn empty_task_succeeds() {
        let result = Runner::new(&Task::new(), ParsedArgs::default())
            .execute()
            .await
            .unwrap();
        assert!(result.success());
    }

    #[tokio::test]
    async fn step_without_work_succeeds() {
        let task = Task::new().add(Step::named("noop"));
        Runner::new(&task, ParsedArgs::default())
            .execute()
            .await
            .unwrap();
        assert_eq!(task.steps()[0].status(), StepStatus::Success);
    }

    #[tokio::test]
    async fn uncaught_failure_without_active_step_is_fatal() {
        let task = Task::new().add(Step::named("done"));
        let runner = Runner::new(&task, ParsedArgs::default());
        runner.execute().await.unwrap();

        runner.report_uncaught(anyhow!("late error"));
        assert_eq!(runner.exit_code(), 1);
        assert_eq!(task.steps()[0].status(), StepStatus::Success);

        let err = runner.execute().await.unwrap_err();
        assert!(matches!(err, TaskError::Unattributed { .. }));
        assert!(err.to_string().contains("late error"));
    }

    #[tokio::test]
    async fn uncaught_failure_goes_to_active_step() {
        let task = Task::new().add(Step::named("busy"));
        let runner = Runner::new(&task, ParsedArgs::default());
        let step = Arc::clone(&task.steps()[0]);
        step.start();

        runner.report_uncaught(anyhow!("socket closed"));
        assert_eq!(step.status(), StepStatus::Failure);
        assert_eq!(step.error_message().as_deref(), Some("socket closed"));
        assert_eq!(runner.exit_code(), 1);
    }
}
