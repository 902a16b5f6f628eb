//! # Worker channel: wire protocol, spawner seam, and the worker-side loop.
//!
//! Everything the process adapter needs to talk to an out-of-process worker:
//!
//! - [`Request`] / [`Response`] — the control-message protocol, correlated by
//!   request id so overlapping call/response pairs are never confused.
//! - [`WorkerSpawner`] / [`WorkerChannel`] — the seam over the underlying
//!   process primitive. The shipped [`StdioSpawner`] spawns a worker program
//!   and exchanges JSON lines over its stdio; tests inject scripted in-memory
//!   spawners through the same trait.
//! - [`serve`] / [`refuse`] and [`WorkerModule`] — the worker half: the loop a
//!   worker binary calls to speak the protocol from the other side.
//!
//! ```text
//!  ProcessAdapter                         worker binary
//!  ──────────────                         ─────────────
//!  init() ───────── spawn ──────────────► load module
//!         ◄──────── ready / load-error ── serve(module) / refuse(reason)
//!  run(args) ────── start {id, args} ───► module.run(token, args)
//!            ◄───── result/error {id} ───
//!  abort() ──────── stop {id} ──────────► token.cancel() + module.stop()
//!          ◄─────── stopped/stop-error ──
//! ```

mod protocol;
mod serve;
mod spawn;

pub use protocol::{Request, Response};
pub use serve::{refuse, serve, WorkerModule};
pub use spawn::{StdioSpawner, TerminateFn, WorkerChannel, WorkerSpawner};
