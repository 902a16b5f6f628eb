//! # Execution adapters.
//!
//! An [`Adapter`] is a strategy implementing how a task is actually executed
//! behind the one capability set {init, run, abort, destroy}:
//!
//! - [`AsyncAdapter`] runs a caller-supplied cooperative function in-process;
//!   cancellation is delivered through a one-shot token.
//! - [`ProcessAdapter`] runs a module in a spawned worker and maps the
//!   control-message protocol onto the same contract.
//!
//! The [`Task`](crate::Task) facade is generic over the adapter and never
//! branches on which strategy it holds.

mod adapter;
mod asynchronous;
mod process;

pub use adapter::Adapter;
pub use asynchronous::AsyncAdapter;
pub use process::ProcessAdapter;
