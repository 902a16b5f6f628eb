//! # The execution-strategy contract.
//!
//! Any way of running one task — in-process or out-of-process — satisfies
//! this one capability set. The [`Task`](crate::Task) facade drives an
//! adapter through the lifecycle state machine and owns it exclusively; the
//! adapter exclusively owns whatever execution resource it allocates (a
//! cancellation token source, a child process) and is the only party that
//! releases it.

use async_trait::async_trait;

use crate::error::TaskError;

/// # Capability contract for one execution strategy.
///
/// Methods take `&self`: the adapter manages its resource behind interior
/// mutability so `destroy` may be invoked while a `run` or `abort` is still
/// pending (the escape hatch for forced teardown). A task never has two of
/// `init`/`run`/`abort` logically in flight at once; the facade's state
/// preconditions enforce that.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Argument type accepted by [`run`](Adapter::run).
    type Args: Send;
    /// Value type produced by a successful [`run`](Adapter::run).
    type Output: Send;

    /// Acquires whatever the strategy needs before it can run.
    ///
    /// Suspends until preparation completes (for a worker: spawn plus load
    /// handshake). Must release anything it acquired before reporting failure.
    async fn init(&self) -> Result<(), TaskError>;

    /// Executes the task once and suspends until it settles.
    async fn run(&self, args: Self::Args) -> Result<Self::Output, TaskError>;

    /// Requests cooperative termination of the in-flight execution.
    ///
    /// Fails with [`TaskError::Precondition`] if no run is in flight.
    async fn abort(&self) -> Result<(), TaskError>;

    /// Releases all resources. Synchronous, idempotent, never fails.
    fn destroy(&self);
}
