//! # Spawner seam and the stdio worker implementation.
//!
//! [`WorkerSpawner`] abstracts the underlying process primitive: given a
//! target, yield a [`WorkerChannel`] — a bidirectional message channel plus a
//! termination hook. The process adapter is written against this trait, so
//! tests can substitute scripted in-memory workers.
//!
//! [`StdioSpawner`] is the shipped implementation: it spawns a worker program
//! with the module path as its argument and exchanges the protocol as JSON
//! lines over the child's stdin/stdout. The response stream closing is the
//! exit signal; a child that dies takes its stdout with it.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::error::TaskError;
use crate::worker::protocol::{Request, Response};

/// Termination hook handed out by a spawner.
///
/// Must be callable any number of times and never block.
pub type TerminateFn = Box<dyn Fn() + Send + Sync>;

/// Bidirectional message channel to a spawned worker.
///
/// The `responses` receiver yields messages in arrival order and closes when
/// the worker exits; that close is the only exit signal the adapter sees.
pub struct WorkerChannel {
    /// Outbound control messages.
    pub requests: mpsc::Sender<Request>,
    /// Inbound replies; closes on worker exit.
    pub responses: mpsc::Receiver<Response>,
    /// Forcibly terminates the worker. Idempotent.
    pub terminate: TerminateFn,
}

/// # Process-spawning seam.
///
/// The process adapter treats the spawner as a black box that accepts a
/// target program and yields a [`WorkerChannel`]. Implement this to run
/// workers over something other than stdio (or to script them in tests).
#[async_trait]
pub trait WorkerSpawner: Send + Sync {
    /// Spawns one worker and returns its channel.
    ///
    /// A failure to even start the worker is a [`TaskError::ModuleLoad`]:
    /// from the caller's point of view the module never became executable.
    async fn spawn(&self) -> Result<WorkerChannel, TaskError>;
}

/// Spawns a worker program over piped stdio, speaking JSON lines.
///
/// The worker program receives the module path as its single argument and is
/// expected to call [`serve`](crate::serve) (or [`refuse`](crate::refuse))
/// once its module is loaded.
///
/// # Example
/// ```no_run
/// use unitask::StdioSpawner;
///
/// let spawner = StdioSpawner::new("./target/release/worker", "jobs/resize.bin");
/// ```
pub struct StdioSpawner {
    program: PathBuf,
    module: PathBuf,
    capacity: usize,
}

impl StdioSpawner {
    /// Creates a spawner for `program <module>` with the default channel capacity.
    pub fn new(program: impl Into<PathBuf>, module: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            module: module.into(),
            capacity: 32,
        }
    }

    /// Sets the request/response channel capacity (clamped to at least 1).
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }
}

#[async_trait]
impl WorkerSpawner for StdioSpawner {
    async fn spawn(&self) -> Result<WorkerChannel, TaskError> {
        debug!(
            program = %self.program.display(),
            module = %self.module.display(),
            "spawning worker"
        );

        let mut child = Command::new(&self.program)
            .arg(&self.module)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TaskError::ModuleLoad {
                reason: format!("failed to spawn worker {}: {e}", self.program.display()),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| TaskError::ModuleLoad {
            reason: "worker stdin unavailable".into(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| TaskError::ModuleLoad {
            reason: "worker stdout unavailable".into(),
        })?;

        let (req_tx, mut req_rx) = mpsc::channel::<Request>(self.capacity);
        let (resp_tx, resp_rx) = mpsc::channel::<Response>(self.capacity);

        // Writer: one JSON line per request, flushed immediately.
        tokio::spawn(async move {
            while let Some(req) = req_rx.recv().await {
                let line = match serde_json::to_string(&req) {
                    Ok(line) => line,
                    Err(e) => {
                        error!(error = %e, "failed to encode request");
                        break;
                    }
                };
                if stdin.write_all(line.as_bytes()).await.is_err()
                    || stdin.write_all(b"\n").await.is_err()
                    || stdin.flush().await.is_err()
                {
                    break;
                }
            }
        });

        // Reader: forward protocol lines until EOF; dropping resp_tx closes
        // the response stream, which the adapter reads as worker exit.
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match serde_json::from_str::<Response>(&line) {
                    Ok(resp) => {
                        if resp_tx.send(resp).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => debug!(error = %e, "skipping non-protocol worker output"),
                }
            }
            debug!("worker stdout closed");
        });

        let child = Arc::new(Mutex::new(child));
        let terminate: TerminateFn = Box::new(move || {
            let mut child = child.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = child.start_kill() {
                // Already dead; nothing left to release.
                debug!(error = %e, "worker already terminated");
            }
        });

        Ok(WorkerChannel {
            requests: req_tx,
            responses: resp_rx,
            terminate,
        })
    }
}
