//! Error types used by the task lifecycle and its execution adapters.
//!
//! This module defines two main error types:
//!
//! - [`TaskError`] — failures raised while initializing, running, or aborting a task.
//! - [`TransitionError`] — an illegal lifecycle transition; a contract violation
//!   in the caller's usage rather than a runtime condition.
//!
//! Both types provide an `as_label` helper producing short stable labels for
//! logging and metrics.

use thiserror::Error;

use crate::fsm::{TaskEvent, TaskState};

/// # Errors produced by task execution.
///
/// Every failure of `init`/`run`/`abort` surfaces as one of these variants,
/// unchanged, through the [`Task`](crate::Task) facade. `destroy` never fails.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The worker's module path was missing or the module threw during load.
    ///
    /// Surfaces from `init` on the process adapter. The spawned worker is
    /// terminated before this error is returned.
    #[error("module load failed: {reason}")]
    ModuleLoad {
        /// Reason reported by the worker handshake (or the spawn failure).
        reason: String,
    },

    /// An operation was invoked while the task was in an incompatible state,
    /// e.g. `run` before `init`, or `abort` with no run in flight.
    #[error("operation not allowed: {message}")]
    Precondition {
        /// Which precondition was violated.
        message: String,
    },

    /// The task's own logic failed during `run`.
    #[error("task execution failed: {error}")]
    Execution {
        /// The underlying error message.
        error: String,
    },

    /// The task's cancellation handling failed during `abort`.
    ///
    /// Distinct from [`TaskError::Execution`] because it occurs while the task
    /// is `Stopping`, and it forces the terminal state to `Error` rather than
    /// `Stopped`.
    #[error("task failed while stopping: {error}")]
    Abort {
        /// The underlying error message.
        error: String,
    },

    /// The worker process exited unexpectedly while a call was outstanding.
    ///
    /// Process adapter only: the outstanding `run` or `abort` fails with this
    /// instead of hanging forever.
    #[error("worker crashed: {reason}")]
    WorkerCrashed {
        /// What was observed when the worker went away.
        reason: String,
    },

    /// The task exited because its cancellation token fired.
    ///
    /// Returned by cooperative task functions that observe their token and
    /// bail out instead of finishing their work.
    #[error("task canceled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use unitask::TaskError;
    ///
    /// let err = TaskError::Execution { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_execution_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::ModuleLoad { .. } => "task_module_load_failed",
            TaskError::Precondition { .. } => "task_precondition_violated",
            TaskError::Execution { .. } => "task_execution_failed",
            TaskError::Abort { .. } => "task_abort_failed",
            TaskError::WorkerCrashed { .. } => "task_worker_crashed",
            TaskError::Canceled => "task_canceled",
        }
    }
}

/// # Illegal lifecycle transition.
///
/// Produced by [`transition`](crate::transition) when an event is applied to a
/// state it is not valid in. This indicates a defect in the caller's usage of
/// the lifecycle, not a recoverable runtime condition: it should be treated as
/// fatal rather than retried.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid lifecycle transition: {event} not allowed in state {from}")]
pub struct TransitionError {
    /// The state the event was applied in.
    pub from: TaskState,
    /// The event that was not allowed.
    pub event: TaskEvent,
}
