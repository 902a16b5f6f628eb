//! # Out-of-process adapter over a spawned worker.
//!
//! [`ProcessAdapter`] drives a worker through the control-message protocol:
//!
//! - `init` spawns the worker and waits for the load handshake. A failed
//!   handshake terminates the worker before the error surfaces — a failed
//!   init never leaks a process.
//! - `run` and `abort` are correlated request/response pairs. Each call takes
//!   a fresh id from an atomic counter and parks a oneshot sender in the
//!   pending-call table; a reader loop routes every worker reply to the call
//!   that owns its id.
//! - Worker exit with calls outstanding fails every parked call with
//!   [`TaskError::WorkerCrashed`] instead of leaving it hung.
//! - `destroy` force-terminates the worker if still alive and releases the
//!   channel; idempotent and infallible. It may arrive while an `init` is
//!   still handshaking — the forced-teardown escape hatch — in which case it
//!   wins: the worker is terminated at install time instead of going live.
//!
//! ```text
//!  run/abort ──► pending table ──► requests ──► worker
//!                     ▲                            │
//!                     └──── reader loop ◄── responses (closes on exit)
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time;
use tracing::{debug, warn};

use crate::adapters::adapter::Adapter;
use crate::config::ProcessConfig;
use crate::error::TaskError;
use crate::worker::{Request, Response, StdioSpawner, TerminateFn, WorkerSpawner};

/// Replies routed through the pending-call table.
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Response, TaskError>>>>>;

/// Live connection to a spawned worker, present between `init` and `destroy`.
struct Link {
    requests: mpsc::Sender<Request>,
    terminate: TerminateFn,
}

/// Connection slot guarded by the link lock.
///
/// `Destroyed` is sticky: once `destroy` ran, a handshake that was pending at
/// the time must not install a live worker behind the caller's back.
enum Slot {
    /// No worker yet.
    Idle,
    /// Worker spawned and handshaken.
    Live(Link),
    /// `destroy` ran; nothing may be installed after this.
    Destroyed,
}

/// Executes a module in a spawned worker process.
///
/// Arguments and results are [`serde_json::Value`]: they cross a process
/// boundary, so only data representable in the channel's message format is
/// transferable — functions and live handles are not.
pub struct ProcessAdapter<S: WorkerSpawner> {
    spawner: S,
    config: ProcessConfig,
    link: Mutex<Slot>,
    pending: Pending,
    next_id: AtomicU64,
}

/// A poisoned lock only means some other thread panicked mid-update; the
/// table and link slot stay structurally valid, so keep going.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl ProcessAdapter<StdioSpawner> {
    /// Runs `program <module>` over stdio with the default configuration.
    pub fn from_module(
        program: impl Into<std::path::PathBuf>,
        module: impl Into<std::path::PathBuf>,
    ) -> Self {
        let config = ProcessConfig::default();
        let spawner = StdioSpawner::new(program, module).with_capacity(config.channel_capacity);
        Self::new(spawner, config)
    }
}

impl<S: WorkerSpawner> ProcessAdapter<S> {
    /// Wraps a spawner as an execution strategy.
    pub fn new(spawner: S, config: ProcessConfig) -> Self {
        Self {
            spawner,
            config,
            link: Mutex::new(Slot::Idle),
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Waits for the worker's first message and interprets it as a handshake.
    async fn handshake(responses: &mut mpsc::Receiver<Response>) -> Result<(), TaskError> {
        match responses.recv().await {
            Some(Response::Ready) => Ok(()),
            Some(Response::LoadError { reason }) => Err(TaskError::ModuleLoad { reason }),
            Some(other) => Err(TaskError::ModuleLoad {
                reason: format!("unexpected handshake message: {other:?}"),
            }),
            None => Err(TaskError::ModuleLoad {
                reason: "worker exited before completing the handshake".into(),
            }),
        }
    }

    /// Sends one correlated request and awaits its reply.
    async fn call(&self, id: u64, request: Request) -> Result<Response, TaskError> {
        let requests = match &*lock(&self.link) {
            Slot::Live(link) => link.requests.clone(),
            Slot::Idle | Slot::Destroyed => {
                return Err(TaskError::Precondition {
                    message: "worker is not initialized".into(),
                })
            }
        };

        let (tx, rx) = oneshot::channel();
        lock(&self.pending).insert(id, tx);

        if requests.send(request).await.is_err() {
            lock(&self.pending).remove(&id);
            return Err(TaskError::WorkerCrashed {
                reason: "control channel closed".into(),
            });
        }

        match rx.await {
            Ok(reply) => reply,
            // Sender dropped without a reply: the table was torn down.
            Err(_) => Err(TaskError::WorkerCrashed {
                reason: "worker went away with the call outstanding".into(),
            }),
        }
    }
}

#[async_trait]
impl<S: WorkerSpawner> Adapter for ProcessAdapter<S> {
    type Args = Value;
    type Output = Value;

    async fn init(&self) -> Result<(), TaskError> {
        if matches!(*lock(&self.link), Slot::Destroyed) {
            // Already torn down; settle without acquiring anything.
            return Ok(());
        }

        let channel = self.spawner.spawn().await?;
        let requests = channel.requests;
        let mut responses = channel.responses;
        let terminate = channel.terminate;

        let outcome = if self.config.handshake_timeout > Duration::ZERO {
            match time::timeout(
                self.config.handshake_timeout,
                Self::handshake(&mut responses),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(TaskError::ModuleLoad {
                    reason: format!(
                        "handshake timed out after {:?}",
                        self.config.handshake_timeout
                    ),
                }),
            }
        } else {
            Self::handshake(&mut responses).await
        };

        if let Err(e) = outcome {
            // The process is up but unusable; release it before reporting.
            (terminate)();
            return Err(e);
        }
        debug!("worker handshake complete");

        // Reader loop: route correlated replies; on worker exit, fail every
        // call still parked in the table.
        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            while let Some(resp) = responses.recv().await {
                match resp.id() {
                    Some(id) => match lock(&pending).remove(&id) {
                        Some(tx) => {
                            let _ = tx.send(Ok(resp));
                        }
                        None => debug!(id, "dropping reply with no pending call"),
                    },
                    None => debug!("dropping handshake message after init"),
                }
            }

            let stranded: Vec<_> = lock(&pending).drain().collect();
            if !stranded.is_empty() {
                warn!(calls = stranded.len(), "worker exited with calls outstanding");
            }
            for (_, tx) in stranded {
                let _ = tx.send(Err(TaskError::WorkerCrashed {
                    reason: "worker exited with the call outstanding".into(),
                }));
            }
        });

        let mut slot = lock(&self.link);
        if matches!(*slot, Slot::Destroyed) {
            // A destroy raced the handshake; it wins. Release the worker
            // instead of installing it behind the caller's back.
            drop(slot);
            (terminate)();
            return Ok(());
        }
        *slot = Slot::Live(Link {
            requests,
            terminate,
        });
        Ok(())
    }

    async fn run(&self, args: Value) -> Result<Value, TaskError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        match self.call(id, Request::Start { id, args }).await? {
            Response::Result { value, .. } => Ok(value),
            Response::Error { reason, .. } => Err(TaskError::Execution { error: reason }),
            other => Err(TaskError::WorkerCrashed {
                reason: format!("mismatched reply to start: {other:?}"),
            }),
        }
    }

    async fn abort(&self) -> Result<(), TaskError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        match self.call(id, Request::Stop { id }).await? {
            Response::Stopped { .. } => Ok(()),
            Response::StopError { reason, .. } => Err(TaskError::Abort { error: reason }),
            other => Err(TaskError::WorkerCrashed {
                reason: format!("mismatched reply to stop: {other:?}"),
            }),
        }
    }

    fn destroy(&self) {
        let previous = std::mem::replace(&mut *lock(&self.link), Slot::Destroyed);
        if let Slot::Live(link) = previous {
            debug!("terminating worker");
            (link.terminate)();
        }
        // Dropping the parked senders settles any outstanding call as crashed.
        lock(&self.pending).clear();
    }
}
