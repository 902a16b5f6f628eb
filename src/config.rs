//! # Process adapter configuration.
//!
//! [`ProcessConfig`] controls how the process adapter talks to its worker:
//! how long to wait for the load handshake and how deep the control-message
//! channels are.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use unitask::ProcessConfig;
//!
//! let mut cfg = ProcessConfig::default();
//! cfg.handshake_timeout = Duration::from_secs(5);
//!
//! assert_eq!(cfg.handshake_timeout, Duration::from_secs(5));
//! ```

use std::time::Duration;

/// Configuration for the process adapter and its worker channel.
#[derive(Clone, Debug)]
pub struct ProcessConfig {
    /// Maximum time to wait for the worker's load handshake (0 = wait forever).
    pub handshake_timeout: Duration,
    /// Capacity of the request/response channels between adapter and worker.
    pub channel_capacity: usize,
}

impl Default for ProcessConfig {
    /// Provides a default configuration:
    /// - `handshake_timeout = 10s`
    /// - `channel_capacity = 32`
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(10),
            channel_capacity: 32,
        }
    }
}
