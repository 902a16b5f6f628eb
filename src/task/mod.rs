//! # The task facade.
//!
//! [`Task`] is the object callers interact with: it owns one adapter
//! instance, drives it through the lifecycle state machine, and exposes
//! `status`, `init`, `run`, `abort`, `destroy`.

mod cell;
mod facade;

pub use facade::Task;
