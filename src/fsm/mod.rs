//! # Task lifecycle state machine.
//!
//! Pure logic, no I/O: the finite set of lifecycle states ([`TaskState`]),
//! the events that move between them ([`TaskEvent`]), and the [`transition`]
//! function that applies one to the other.
//!
//! ```text
//! Created ──InitSucceeded──► Ready ──RunStarted──► Running ──RunSucceeded──► Completed
//!    │                                                │ │
//!    InitFailed                                       │ RunFailed ─────────► Error
//!    ▼                                                ▼
//!  Error                   Stopped ◄──AbortSucceeded── Stopping ◄─AbortRequested
//!                                                     │
//!                                                     AbortFailed ─────────► Error
//! ```
//!
//! Any other state/event pairing is a [`TransitionError`](crate::TransitionError):
//! a defect in the caller's usage, not a runtime condition.

mod state;
mod transition;

pub use state::TaskState;
pub use transition::{transition, TaskEvent};
