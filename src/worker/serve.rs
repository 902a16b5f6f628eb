//! # Worker-side protocol loop.
//!
//! A worker binary loads its module however it likes, then hands the loaded
//! module to [`serve`]. The loop emits the `ready` handshake, executes `start`
//! requests, and cancels the in-flight token (plus runs the module's stop
//! hook) on `stop` requests, answering each request with its correlated
//! response. A binary whose module fails to load calls [`refuse`] instead.
//!
//! ```no_run
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//! use tokio_util::sync::CancellationToken;
//! use unitask::{serve, TaskError, WorkerModule};
//!
//! struct Doubler;
//!
//! #[async_trait]
//! impl WorkerModule for Doubler {
//!     async fn run(&self, ctx: CancellationToken, args: Value) -> Result<Value, TaskError> {
//!         if ctx.is_cancelled() {
//!             return Err(TaskError::Canceled);
//!         }
//!         let n = args.as_u64().unwrap_or(0);
//!         Ok(json!(n * 2))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> std::io::Result<()> {
//!     serve(Doubler).await
//! }
//! ```

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::TaskError;
use crate::worker::protocol::{Request, Response};

/// # One loadable unit of worker logic.
///
/// `run` receives a [`CancellationToken`] and should check it cooperatively;
/// the token fires when the adapter requests a stop. The optional `stop` hook
/// runs after the token is cancelled — a failing hook is reported to the
/// adapter as a `stop-error`.
#[async_trait]
pub trait WorkerModule: Send + Sync + 'static {
    /// Executes the module with the given arguments.
    async fn run(&self, ctx: CancellationToken, args: Value) -> Result<Value, TaskError>;

    /// Runs the module's own termination logic after a stop request.
    async fn stop(&self) -> Result<(), TaskError> {
        Ok(())
    }
}

/// Speaks the worker half of the protocol over stdin/stdout until EOF.
///
/// Emits `ready`, then serves requests: each `start` runs the module in its
/// own task; each `stop` cancels the current token and runs the stop hook.
/// Returns when the adapter closes the channel (or terminates the process).
pub async fn serve<M: WorkerModule>(module: M) -> io::Result<()> {
    let module = Arc::new(module);
    let (out_tx, mut out_rx) = mpsc::channel::<Response>(32);

    // Single writer so concurrent replies never interleave mid-line.
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(resp) = out_rx.recv().await {
            let line = match serde_json::to_string(&resp) {
                Ok(line) => line,
                Err(_) => continue,
            };
            if stdout.write_all(line.as_bytes()).await.is_err()
                || stdout.write_all(b"\n").await.is_err()
                || stdout.flush().await.is_err()
            {
                break;
            }
        }
    });

    let _ = out_tx.send(Response::Ready).await;

    // Token of the in-flight start, cancelled by the next stop request.
    let current: Arc<Mutex<Option<CancellationToken>>> = Arc::new(Mutex::new(None));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let req = match serde_json::from_str::<Request>(&line) {
            Ok(req) => req,
            Err(e) => {
                debug!(error = %e, "skipping malformed request line");
                continue;
            }
        };
        match req {
            Request::Start { id, args } => {
                let token = CancellationToken::new();
                *current.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.clone());

                let module = Arc::clone(&module);
                let out = out_tx.clone();
                tokio::spawn(async move {
                    let resp = match module.run(token, args).await {
                        Ok(value) => Response::Result { id, value },
                        Err(e) => Response::Error {
                            id,
                            reason: e.to_string(),
                        },
                    };
                    let _ = out.send(resp).await;
                });
            }
            Request::Stop { id } => {
                let token = current.lock().unwrap_or_else(|e| e.into_inner()).take();
                if let Some(token) = token {
                    token.cancel();
                }

                let module = Arc::clone(&module);
                let out = out_tx.clone();
                tokio::spawn(async move {
                    let resp = match module.stop().await {
                        Ok(()) => Response::Stopped { id },
                        Err(e) => Response::StopError {
                            id,
                            reason: e.to_string(),
                        },
                    };
                    let _ = out.send(resp).await;
                });
            }
        }
    }

    drop(out_tx);
    let _ = writer.await;
    Ok(())
}

/// Reports a failed module load and exits the protocol.
///
/// The worker binary calls this instead of [`serve`] when its module path is
/// missing or the module threw during load; the adapter's `init` surfaces the
/// reason as a module-load failure.
pub async fn refuse(reason: impl Into<String>) -> io::Result<()> {
    let line = serde_json::to_string(&Response::LoadError {
        reason: reason.into(),
    })
    .map_err(io::Error::other)?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
