//! # Control-message protocol between adapter and worker.
//!
//! Messages cross a process boundary, so payloads are [`serde_json::Value`]:
//! only data representable in JSON is transferable. Every call-style message
//! carries a correlation id; the worker echoes it in the reply so overlapping
//! request/response pairs are never confused.
//!
//! On the wire each message is one JSON line tagged by `type`:
//!
//! ```text
//! {"type":"start","id":1,"args":null}
//! {"type":"result","id":1,"value":"result"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Control message sent from the adapter to the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    /// Invoke the worker's module with `args`.
    Start {
        /// Correlation id echoed by the `result`/`error` reply.
        id: u64,
        /// Call arguments, forwarded to the module as-is.
        args: Value,
    },
    /// Request cooperative termination of the in-flight execution.
    Stop {
        /// Correlation id echoed by the `stopped`/`stop-error` reply.
        id: u64,
    },
}

/// Control message sent from the worker to the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Response {
    /// Handshake: the module loaded without throwing.
    Ready,
    /// Handshake: the module failed to load.
    LoadError {
        /// Why the load failed.
        reason: String,
    },
    /// The `start` with this id settled with a value.
    Result {
        /// Correlation id of the originating `start`.
        id: u64,
        /// The module's return value.
        value: Value,
    },
    /// The `start` with this id settled with a failure.
    Error {
        /// Correlation id of the originating `start`.
        id: u64,
        /// The module's error message.
        reason: String,
    },
    /// The `stop` with this id was acknowledged cleanly.
    Stopped {
        /// Correlation id of the originating `stop`.
        id: u64,
    },
    /// The worker's stop handling itself threw.
    StopError {
        /// Correlation id of the originating `stop`.
        id: u64,
        /// The stop hook's error message.
        reason: String,
    },
}

impl Response {
    /// Returns the correlation id, or `None` for handshake messages.
    pub fn id(&self) -> Option<u64> {
        match self {
            Response::Ready | Response::LoadError { .. } => None,
            Response::Result { id, .. }
            | Response::Error { id, .. }
            | Response::Stopped { id }
            | Response::StopError { id, .. } => Some(*id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let start = serde_json::to_value(Request::Start {
            id: 7,
            args: json!([1, 2]),
        })
        .unwrap();
        assert_eq!(start, json!({"type": "start", "id": 7, "args": [1, 2]}));

        let stop = serde_json::to_value(Request::Stop { id: 8 }).unwrap();
        assert_eq!(stop, json!({"type": "stop", "id": 8}));
    }

    #[test]
    fn test_response_wire_shape() {
        let ready: Response = serde_json::from_value(json!({"type": "ready"})).unwrap();
        assert_eq!(ready, Response::Ready);

        let stop_error: Response =
            serde_json::from_value(json!({"type": "stop-error", "id": 3, "reason": "boom"}))
                .unwrap();
        assert_eq!(
            stop_error,
            Response::StopError {
                id: 3,
                reason: "boom".into()
            }
        );
    }

    #[test]
    fn test_correlation_ids() {
        assert_eq!(Response::Ready.id(), None);
        assert_eq!(Response::LoadError { reason: "x".into() }.id(), None);
        assert_eq!(Response::Stopped { id: 5 }.id(), Some(5));
        assert_eq!(
            Response::Result {
                id: 9,
                value: json!(null)
            }
            .id(),
            Some(9)
        );
    }
}
