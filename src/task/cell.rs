//! # Atomic holder for the observable lifecycle state.
//!
//! All transitions go through one mutex, so a check-and-transition is a
//! single atomic step from the caller's point of view: no intermediate state
//! is ever observable, and no transition is skipped or duplicated.

use std::sync::{Mutex, MutexGuard};

use crate::error::TransitionError;
use crate::fsm::{transition, TaskEvent, TaskState};

pub(crate) struct StateCell {
    state: Mutex<TaskState>,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(TaskState::Created),
        }
    }

    fn guard(&self) -> MutexGuard<'_, TaskState> {
        // The state is a plain Copy value; a poisoned lock cannot leave it
        // half-written, so recover the guard.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current state. Never blocks for long and never fails.
    pub(crate) fn get(&self) -> TaskState {
        *self.guard()
    }

    /// Applies `event` unconditionally, failing on an illegal pairing.
    pub(crate) fn apply(&self, event: TaskEvent) -> Result<TaskState, TransitionError> {
        let mut state = self.guard();
        let next = transition(*state, event)?;
        *state = next;
        Ok(next)
    }

    /// Applies `event` only if the state is still `expected`.
    ///
    /// Used where a settle path may have lost a race: a run that finishes
    /// after an abort moved the task to `Stopping` must not touch the state.
    pub(crate) fn apply_if(&self, expected: TaskState, event: TaskEvent) -> Option<TaskState> {
        let mut state = self.guard();
        if *state != expected {
            return None;
        }
        let next = transition(*state, event).ok()?;
        *state = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_created() {
        assert_eq!(StateCell::new().get(), TaskState::Created);
    }

    #[test]
    fn test_apply_moves_the_state() {
        let cell = StateCell::new();
        assert_eq!(
            cell.apply(TaskEvent::InitSucceeded).unwrap(),
            TaskState::Ready
        );
        assert_eq!(cell.get(), TaskState::Ready);
    }

    #[test]
    fn test_apply_rejects_illegal_events_without_moving() {
        let cell = StateCell::new();
        assert!(cell.apply(TaskEvent::RunStarted).is_err());
        assert_eq!(cell.get(), TaskState::Created);
    }

    #[test]
    fn test_apply_if_is_a_no_op_when_the_state_moved() {
        let cell = StateCell::new();
        cell.apply(TaskEvent::InitSucceeded).unwrap();
        cell.apply(TaskEvent::RunStarted).unwrap();
        cell.apply(TaskEvent::AbortRequested).unwrap();

        // The run settled after the abort won the race.
        assert!(cell
            .apply_if(TaskState::Running, TaskEvent::RunSucceeded)
            .is_none());
        assert_eq!(cell.get(), TaskState::Stopping);
    }
}
