//! # Lifecycle states.
//!
//! [`TaskState`] enumerates the observable states of one task. Exactly one
//! state holds at any instant; `Stopped`, `Completed` and `Error` are
//! terminal.

use std::fmt;

/// Observable lifecycle state of a task.
///
/// Ordered by lifecycle progression (not by value):
/// `Created → Ready → Running → {Completed | Error | Stopping}`;
/// `Stopping → {Stopped | Error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Object constructed, no resources acquired.
    Created,
    /// Initialization succeeded; the execution strategy is prepared.
    Ready,
    /// Execution has been invoked and has not yet settled.
    Running,
    /// An abort has been requested while running; termination not yet acknowledged.
    Stopping,
    /// Abort completed successfully. Terminal, non-error.
    Stopped,
    /// Execution finished successfully. Terminal.
    Completed,
    /// Initialization, execution, or abort failed. Terminal.
    Error,
}

impl TaskState {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskState::Created => "created",
            TaskState::Ready => "ready",
            TaskState::Running => "running",
            TaskState::Stopping => "stopping",
            TaskState::Stopped => "stopped",
            TaskState::Completed => "completed",
            TaskState::Error => "error",
        }
    }

    /// Returns `true` for states no event can leave.
    ///
    /// # Example
    /// ```
    /// use unitask::TaskState;
    ///
    /// assert!(TaskState::Completed.is_terminal());
    /// assert!(!TaskState::Stopping.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Stopped | TaskState::Completed | TaskState::Error
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
