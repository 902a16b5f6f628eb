//! # Lifecycle events and the transition function.
//!
//! [`transition`] is the single source of truth for which [`TaskEvent`] is
//! legal in which [`TaskState`]. The [`Task`](crate::Task) facade applies it
//! under one lock acquisition so transitions are atomic with respect to the
//! caller's view.

use std::fmt;

use crate::error::TransitionError;
use crate::fsm::state::TaskState;

/// Lifecycle event applied to a [`TaskState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    /// Initialization succeeded. Valid from `Created`; produces `Ready`.
    InitSucceeded,
    /// Initialization failed. Valid from `Created`; produces `Error`.
    InitFailed,
    /// Execution was invoked. Valid from `Ready`; produces `Running`.
    RunStarted,
    /// Execution settled with a value. Valid from `Running`; produces `Completed`.
    RunSucceeded,
    /// Execution settled with a failure. Valid from `Running`; produces `Error`.
    RunFailed,
    /// An abort was requested. Valid from `Running`; produces `Stopping`.
    AbortRequested,
    /// Cancellation was acknowledged cleanly. Valid from `Stopping`; produces `Stopped`.
    AbortSucceeded,
    /// Cancellation handling failed. Valid from `Stopping`; produces `Error`.
    AbortFailed,
}

impl TaskEvent {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskEvent::InitSucceeded => "init_succeeded",
            TaskEvent::InitFailed => "init_failed",
            TaskEvent::RunStarted => "run_started",
            TaskEvent::RunSucceeded => "run_succeeded",
            TaskEvent::RunFailed => "run_failed",
            TaskEvent::AbortRequested => "abort_requested",
            TaskEvent::AbortSucceeded => "abort_succeeded",
            TaskEvent::AbortFailed => "abort_failed",
        }
    }
}

impl fmt::Display for TaskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Applies `event` to `from`, returning the next state.
///
/// Any state/event pairing outside the lifecycle diagram fails with
/// [`TransitionError`]; callers must treat that as fatal, not retry it.
///
/// # Example
/// ```
/// use unitask::{transition, TaskEvent, TaskState};
///
/// let next = transition(TaskState::Created, TaskEvent::InitSucceeded).unwrap();
/// assert_eq!(next, TaskState::Ready);
///
/// assert!(transition(TaskState::Completed, TaskEvent::RunStarted).is_err());
/// ```
pub fn transition(from: TaskState, event: TaskEvent) -> Result<TaskState, TransitionError> {
    let next = match (from, event) {
        (TaskState::Created, TaskEvent::InitSucceeded) => TaskState::Ready,
        (TaskState::Created, TaskEvent::InitFailed) => TaskState::Error,
        (TaskState::Ready, TaskEvent::RunStarted) => TaskState::Running,
        (TaskState::Running, TaskEvent::RunSucceeded) => TaskState::Completed,
        (TaskState::Running, TaskEvent::RunFailed) => TaskState::Error,
        (TaskState::Running, TaskEvent::AbortRequested) => TaskState::Stopping,
        (TaskState::Stopping, TaskEvent::AbortSucceeded) => TaskState::Stopped,
        (TaskState::Stopping, TaskEvent::AbortFailed) => TaskState::Error,
        (from, event) => return Err(TransitionError { from, event }),
    };
    Ok(next)
}
