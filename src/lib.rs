//! # unitask
//!
//! **unitask** is a uniform lifecycle wrapper for executing one unit of task
//! logic — either in-process (a cooperative asynchronous function) or
//! out-of-process (a spawned worker speaking a control protocol) — with
//! explicit state tracking, cancellation, and error propagation.
//!
//! Callers treat both execution strategies identically through one
//! polymorphic contract: create, initialize, run with arguments, optionally
//! abort, and destroy. The guarantee is *one task, one lifecycle,
//! deterministic observable states* — nothing more. Orchestrating many tasks
//! is a job for a supervisor built on top of this crate.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                       caller
//!                         │
//!            status/init/run/abort/destroy
//!                         ▼
//!               ┌──────────────────┐
//!               │   Task (facade)  │  state machine:
//!               │   owns StateCell │  Created → Ready → Running
//!               └────────┬─────────┘    → {Completed | Error | Stopping}
//!                        │             Stopping → {Stopped | Error}
//!               Adapter {init, run, abort, destroy}
//!              ┌─────────┴──────────────┐
//!              ▼                        ▼
//!     ┌────────────────┐      ┌──────────────────┐
//!     │  AsyncAdapter  │      │  ProcessAdapter  │
//!     │  in-process fn │      │  spawned worker  │
//!     └───────┬────────┘      └────────┬─────────┘
//!             │                        │
//!     CancellationToken        JSON lines over stdio:
//!     (one-shot, per run)      start/stop ─► result/error/
//!                              stopped/stop-error (+ ready
//!                              handshake), correlated by id
//! ```
//!
//! ### Lifecycle
//! ```text
//! Task::new(adapter)             ──► Created
//! init()     spawn / prepare     ──► Ready        (or Error; no process leak)
//! run(args)  execute             ──► Running
//!   ├─ settles Ok(v)             ──► Completed
//!   ├─ settles Err(e)            ──► Error
//!   └─ abort() while running     ──► Stopping
//!        ├─ acknowledged         ──► Stopped
//!        └─ stop logic failed    ──► Error
//! destroy()  release resources       (any state, idempotent, keeps status)
//! ```
//!
//! ## Features
//! | Area           | Description                                                    | Key types / traits                   |
//! |----------------|----------------------------------------------------------------|--------------------------------------|
//! | **Facade**     | Drive one task through its lifecycle.                          | [`Task`], [`TaskState`]              |
//! | **Adapters**   | Pluggable execution strategies behind one capability set.      | [`Adapter`], [`AsyncAdapter`], [`ProcessAdapter`] |
//! | **Worker**     | Wire protocol, spawner seam, and the worker-side loop.         | [`WorkerSpawner`], [`WorkerModule`], [`serve`] |
//! | **State**      | Pure transition function over states and events.               | [`transition`], [`TaskEvent`]        |
//! | **Errors**     | Typed failures for every lifecycle operation.                  | [`TaskError`], [`TransitionError`]   |
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use unitask::{Task, TaskError, TaskState};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), TaskError> {
//!     let task = Task::from_fn(|ctx: CancellationToken, n: u64| async move {
//!         if ctx.is_cancelled() {
//!             return Err(TaskError::Canceled);
//!         }
//!         Ok(n * 2)
//!     });
//!
//!     assert_eq!(task.status(), TaskState::Created);
//!     task.init().await?;
//!     assert_eq!(task.status(), TaskState::Ready);
//!
//!     let doubled = task.run(21).await?;
//!     assert_eq!(doubled, 42);
//!     assert_eq!(task.status(), TaskState::Completed);
//!
//!     task.destroy();
//!     Ok(())
//! }
//! ```
//!
//! Out-of-process tasks use the same facade: [`Task::from_module`] spawns a
//! worker binary that calls [`serve`] with its loaded module (or [`refuse`]
//! when the module fails to load), and `init`/`run`/`abort`/`destroy` behave
//! identically from the caller's side.

mod adapters;
mod config;
mod error;
mod fsm;
mod task;
mod worker;

pub use adapters::{Adapter, AsyncAdapter, ProcessAdapter};
pub use config::ProcessConfig;
pub use error::{TaskError, TransitionError};
pub use fsm::{transition, TaskEvent, TaskState};
pub use task::Task;
pub use worker::{
    refuse, serve, Request, Response, StdioSpawner, TerminateFn, WorkerChannel, WorkerModule,
    WorkerSpawner,
};
