//! # In-process adapter over a cooperative async function.
//!
//! [`AsyncAdapter`] wraps a caller-supplied closure `Fnc: FnMut(CancellationToken, Args) -> Fut`.
//! The closure is protected by a [`Mutex`] so `run(&self, ...)` can invoke an
//! `FnMut`; the mutex is held only while creating the future (calling the
//! closure), never while the future executes.
//!
//! Each `run` creates a fresh [`CancellationToken`] and retains it as the
//! current controller; `abort` fires that token and returns without waiting
//! for the function to observe it. Whether the run then settles as success,
//! as a cancellation-flavored error, or keeps going is up to the function's
//! own handling of the token — cancellation here is cooperative, not
//! preemptive.

use std::{future::Future, marker::PhantomData, sync::Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::adapters::adapter::Adapter;
use crate::error::TaskError;

/// Executes a caller-supplied cooperative function in-process.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use unitask::{Adapter, AsyncAdapter, TaskError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), TaskError> {
/// let adapter = AsyncAdapter::new(|_ctx: CancellationToken, n: u64| async move {
///     Ok::<_, TaskError>(n * 2)
/// });
///
/// adapter.init().await?;
/// assert_eq!(adapter.run(21).await?, 42);
/// # Ok(())
/// # }
/// ```
pub struct AsyncAdapter<Fnc, Fut, Args, Out>
where
    Fnc: FnMut(CancellationToken, Args) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Out, TaskError>> + Send + 'static,
    Args: Send + 'static,
    Out: Send + 'static,
{
    /// Underlying function (guarded by a mutex to allow `FnMut` with `&self`).
    func: Mutex<Fnc>,
    /// Cancellation source of the in-flight run, created fresh per call.
    controller: Mutex<Option<CancellationToken>>,
    _types: PhantomData<fn(Args) -> Out>,
}

impl<Fnc, Fut, Args, Out> AsyncAdapter<Fnc, Fut, Args, Out>
where
    Fnc: FnMut(CancellationToken, Args) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Out, TaskError>> + Send + 'static,
    Args: Send + 'static,
    Out: Send + 'static,
{
    /// Wraps `func` as an execution strategy.
    ///
    /// The function is shared with the caller in the usual Rust sense: the
    /// adapter owns this handle, the caller keeps whatever state the closure
    /// captures.
    pub fn new(func: Fnc) -> Self {
        Self {
            func: Mutex::new(func),
            controller: Mutex::new(None),
            _types: PhantomData,
        }
    }
}

#[async_trait]
impl<Fnc, Fut, Args, Out> Adapter for AsyncAdapter<Fnc, Fut, Args, Out>
where
    Fnc: FnMut(CancellationToken, Args) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Out, TaskError>> + Send + 'static,
    Args: Send + 'static,
    Out: Send + 'static,
{
    type Args = Args;
    type Output = Out;

    /// No resource to acquire; always succeeds.
    async fn init(&self) -> Result<(), TaskError> {
        Ok(())
    }

    async fn run(&self, args: Args) -> Result<Out, TaskError> {
        let token = CancellationToken::new();

        let fut = {
            let mut func = self.func.lock().map_err(|_| TaskError::Execution {
                error: "task function mutex poisoned".into(),
            })?;
            let mut controller = self.controller.lock().map_err(|_| TaskError::Execution {
                error: "controller mutex poisoned".into(),
            })?;
            *controller = Some(token.clone());
            (func)(token, args)
        };

        fut.await
    }

    async fn abort(&self) -> Result<(), TaskError> {
        let controller = self.controller.lock().map_err(|_| TaskError::Execution {
            error: "controller mutex poisoned".into(),
        })?;
        match controller.as_ref() {
            Some(token) => {
                token.cancel();
                Ok(())
            }
            None => Err(TaskError::Precondition {
                message: "abort requires a run in flight".into(),
            }),
        }
    }

    fn destroy(&self) {
        if let Ok(mut controller) = self.controller.lock() {
            controller.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_run_invokes_function_with_args() {
        let adapter = AsyncAdapter::new(|_ctx: CancellationToken, n: u64| async move {
            Ok::<_, TaskError>(n + 1)
        });

        adapter.init().await.unwrap();
        assert_eq!(adapter.run(41).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_run_propagates_failure() {
        let adapter = AsyncAdapter::new(|_ctx: CancellationToken, ()| async move {
            Err::<(), _>(TaskError::Execution {
                error: "boom".into(),
            })
        });

        let err = adapter.run(()).await.unwrap_err();
        assert!(matches!(err, TaskError::Execution { .. }));
    }

    #[tokio::test]
    async fn test_abort_fires_the_current_token() {
        let adapter = Arc::new(AsyncAdapter::new(|ctx: CancellationToken, ()| async move {
            ctx.cancelled().await;
            Err::<(), _>(TaskError::Canceled)
        }));

        let handle = tokio::spawn({
            let adapter = Arc::clone(&adapter);
            async move { adapter.run(()).await }
        });
        // Let the spawned run reach its await so the controller is in place.
        tokio::task::yield_now().await;

        adapter.abort().await.unwrap();
        assert!(matches!(handle.await.unwrap().unwrap_err(), TaskError::Canceled));
    }

    #[tokio::test]
    async fn test_abort_without_run_is_a_precondition_failure() {
        let adapter =
            AsyncAdapter::new(|_ctx: CancellationToken, ()| async move { Ok::<_, TaskError>(()) });

        let err = adapter.abort().await.unwrap_err();
        assert!(matches!(err, TaskError::Precondition { .. }));
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let adapter =
            AsyncAdapter::new(|_ctx: CancellationToken, ()| async move { Ok::<_, TaskError>(()) });

        adapter.destroy();
        adapter.destroy();

        // Controller is gone, so an abort afterwards is a precondition failure.
        assert!(adapter.abort().await.is_err());
    }
}
