//! Scripted in-memory workers for driving the process adapter.
//!
//! Each [`Script`] mirrors one of the worker-module fixtures a real
//! deployment would ship: a module that completes with a value, one that
//! fails, a stopable one, one whose stop hook throws, one that fails to
//! load, and one that crashes mid-call.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use unitask::{Request, Response, TaskError, WorkerChannel, WorkerSpawner};

#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// Handshake, then answer every start with the value `"result"`.
    Completed,
    /// Handshake, then answer every start with an execution error.
    Error,
    /// Handshake; starts stay pending until a stop arrives, which is
    /// acknowledged (after a short delay) and settles the start with null.
    Stopable,
    /// Like `Stopable`, but the stop hook throws.
    ErrorWhileStopping,
    /// The module throws during load: the handshake reports failure.
    BadModule,
    /// Exit without ever completing the handshake.
    ExitBeforeHandshake,
    /// Loaded but mute: stay alive without ever completing the handshake.
    NeverReady,
    /// Handshake, then die as soon as a start arrives.
    CrashAfterStart,
}

pub struct ScriptedSpawner {
    script: Script,
}

impl ScriptedSpawner {
    pub fn new(script: Script) -> Self {
        Self { script }
    }
}

#[async_trait]
impl WorkerSpawner for ScriptedSpawner {
    async fn spawn(&self) -> Result<WorkerChannel, TaskError> {
        let (req_tx, req_rx) = mpsc::channel::<Request>(8);
        let (resp_tx, resp_rx) = mpsc::channel::<Response>(8);

        tokio::spawn(play(self.script, req_rx, resp_tx));

        Ok(WorkerChannel {
            requests: req_tx,
            responses: resp_rx,
            terminate: Box::new(|| {}),
        })
    }
}

async fn play(script: Script, mut requests: mpsc::Receiver<Request>, replies: mpsc::Sender<Response>) {
    match script {
        Script::BadModule => {
            let _ = replies
                .send(Response::LoadError {
                    reason: "module threw during load".into(),
                })
                .await;
        }
        Script::ExitBeforeHandshake => {}
        Script::NeverReady => {
            while requests.recv().await.is_some() {}
        }
        Script::Completed => {
            let _ = replies.send(Response::Ready).await;
            while let Some(req) = requests.recv().await {
                if let Request::Start { id, .. } = req {
                    let _ = replies
                        .send(Response::Result {
                            id,
                            value: json!("result"),
                        })
                        .await;
                }
            }
        }
        Script::Error => {
            let _ = replies.send(Response::Ready).await;
            while let Some(req) = requests.recv().await {
                if let Request::Start { id, .. } = req {
                    let _ = replies
                        .send(Response::Error {
                            id,
                            reason: "task logic threw".into(),
                        })
                        .await;
                }
            }
        }
        Script::Stopable | Script::ErrorWhileStopping => {
            let _ = replies.send(Response::Ready).await;
            let mut in_flight: Option<u64> = None;
            while let Some(req) = requests.recv().await {
                match req {
                    Request::Start { id, .. } => in_flight = Some(id),
                    Request::Stop { id } => {
                        // Keep the adapter in Stopping long enough to observe it.
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        let ack = match script {
                            Script::Stopable => Response::Stopped { id },
                            _ => Response::StopError {
                                id,
                                reason: "stop hook threw".into(),
                            },
                        };
                        let _ = replies.send(ack).await;
                        if let Some(run_id) = in_flight.take() {
                            let _ = replies
                                .send(Response::Result {
                                    id: run_id,
                                    value: Value::Null,
                                })
                                .await;
                        }
                    }
                }
            }
        }
        Script::CrashAfterStart => {
            let _ = replies.send(Response::Ready).await;
            let _ = requests.recv().await;
            // Returning drops the reply sender: the response stream closes
            // with the start still unanswered, exactly like a dead process.
        }
    }
}
