//! # One task, one lifecycle.
//!
//! [`Task`] wraps one execution adapter and serializes the failure-prone
//! sequence spawn-or-prepare → execute → cancel-on-demand → terminate into
//! the small set of observable [`TaskState`]s. Both execution strategies are
//! driven identically; the facade is generic over [`Adapter`] and never
//! branches on which one it holds.
//!
//! The state a caller reads is linearized: `status()` immediately after an
//! awaited operation reflects that operation's outcome exactly once. When a
//! run settles while an abort already moved the task to `Stopping`, the abort
//! path owns the terminal transition and the settle path leaves the state
//! alone — every terminal transition is reached exactly once.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::adapters::{Adapter, AsyncAdapter, ProcessAdapter};
use crate::error::TaskError;
use crate::fsm::{TaskEvent, TaskState};
use crate::task::cell::StateCell;
use crate::worker::StdioSpawner;

/// One schedulable unit of work with an observable lifecycle.
///
/// Owns exactly one adapter for its entire lifetime. At most one `run` may be
/// outstanding; a second `run` (or any operation out of order) fails with
/// [`TaskError::Precondition`]. `destroy` is permitted from any state, any
/// number of times, and also runs on drop.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use unitask::{Task, TaskError, TaskState};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), TaskError> {
/// let task = Task::from_fn(|_ctx: CancellationToken, n: u64| async move {
///     Ok::<_, TaskError>(n * 2)
/// });
/// assert_eq!(task.status(), TaskState::Created);
///
/// task.init().await?;
/// assert_eq!(task.run(21).await?, 42);
/// assert_eq!(task.status(), TaskState::Completed);
///
/// task.destroy();
/// # Ok(())
/// # }
/// ```
pub struct Task<A: Adapter> {
    adapter: A,
    state: StateCell,
}

impl<A: Adapter> Task<A> {
    /// Wraps an adapter; the task starts in [`TaskState::Created`].
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            state: StateCell::new(),
        }
    }

    /// Current lifecycle state. Synchronous, always available, never fails.
    ///
    /// Remains inspectable after `destroy` — the task becomes unusable, but
    /// its last state stays readable for diagnostics.
    pub fn status(&self) -> TaskState {
        self.state.get()
    }

    /// Prepares the execution strategy: `Created → Ready`, or `Error` on failure.
    ///
    /// Suspends until preparation completes (for a worker: spawn plus load
    /// handshake). Fails with whatever the adapter's init failed with.
    pub async fn init(&self) -> Result<(), TaskError> {
        if self.state.get() != TaskState::Created {
            return Err(TaskError::Precondition {
                message: format!("init requires state created, task is {}", self.state.get()),
            });
        }

        match self.adapter.init().await {
            Ok(()) => {
                let _ = self.state.apply_if(TaskState::Created, TaskEvent::InitSucceeded);
                debug!(state = %self.state.get(), "task initialized");
                Ok(())
            }
            Err(e) => {
                let _ = self.state.apply_if(TaskState::Created, TaskEvent::InitFailed);
                Err(e)
            }
        }
    }

    /// Executes the task once: `Ready → Running → {Completed | Error}`.
    ///
    /// Requires state `Ready`; fails with [`TaskError::Precondition`]
    /// otherwise. If an abort moves the task to `Stopping` before the run
    /// settles, the settle leaves the state to the abort path but still
    /// returns the underlying outcome.
    pub async fn run(&self, args: A::Args) -> Result<A::Output, TaskError> {
        self.state
            .apply(TaskEvent::RunStarted)
            .map_err(|e| TaskError::Precondition {
                message: format!("run requires state ready ({e})"),
            })?;
        debug!("task running");

        match self.adapter.run(args).await {
            Ok(value) => {
                let _ = self.state.apply_if(TaskState::Running, TaskEvent::RunSucceeded);
                Ok(value)
            }
            Err(e) => {
                let _ = self.state.apply_if(TaskState::Running, TaskEvent::RunFailed);
                Err(e)
            }
        }
    }

    /// Requests cancellation: `Running → Stopping → {Stopped | Error}`.
    ///
    /// The move to `Stopping` is observable before the abort settles. In any
    /// state other than `Running` this is a no-op that resolves immediately
    /// (idempotent cancellation). Cancellation is cooperative: the abort
    /// settling does not imply the run's own future has settled — await both.
    pub async fn abort(&self) -> Result<(), TaskError> {
        if self
            .state
            .apply_if(TaskState::Running, TaskEvent::AbortRequested)
            .is_none()
        {
            return Ok(());
        }
        debug!("task stopping");

        match self.adapter.abort().await {
            Ok(()) => {
                let _ = self.state.apply_if(TaskState::Stopping, TaskEvent::AbortSucceeded);
                Ok(())
            }
            Err(e) => {
                let _ = self.state.apply_if(TaskState::Stopping, TaskEvent::AbortFailed);
                Err(e)
            }
        }
    }

    /// Releases all resources. Synchronous, permitted from any state,
    /// tolerates repeated calls, and never fails; cleanup problems are
    /// best-effort and discarded. Does not change [`status`](Task::status).
    pub fn destroy(&self) {
        self.adapter.destroy();
    }
}

impl<A: Adapter> Drop for Task<A> {
    fn drop(&mut self) {
        self.adapter.destroy();
    }
}

impl<Fnc, Fut, Args, Out> Task<AsyncAdapter<Fnc, Fut, Args, Out>>
where
    Fnc: FnMut(CancellationToken, Args) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Out, TaskError>> + Send + 'static,
    Args: Send + 'static,
    Out: Send + 'static,
{
    /// Task over an in-process cooperative function.
    ///
    /// The function receives a fresh [`CancellationToken`] per run and should
    /// observe it to honor aborts.
    pub fn from_fn(func: Fnc) -> Self {
        Task::new(AsyncAdapter::new(func))
    }
}

impl Task<ProcessAdapter<StdioSpawner>> {
    /// Task over a worker process: `program <module>` speaking the control
    /// protocol over stdio.
    pub fn from_module(
        program: impl Into<std::path::PathBuf>,
        module: impl Into<std::path::PathBuf>,
    ) -> Self {
        Task::new(ProcessAdapter::from_module(program, module))
    }
}

impl<S: crate::worker::WorkerSpawner> Task<ProcessAdapter<S>> {
    /// Task over a custom worker spawner (in-memory workers, other transports).
    pub fn from_spawner(spawner: S, config: crate::ProcessConfig) -> Self {
        Task::new(ProcessAdapter::new(spawner, config))
    }
}
