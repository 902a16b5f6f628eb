//! Lifecycle tests for the in-process (async function) adapter.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use unitask::{Task, TaskError, TaskState};

#[tokio::test]
async fn test_fresh_task_reports_created() {
    let task = Task::from_fn(|_ctx: CancellationToken, ()| async move { Ok::<_, TaskError>(()) });
    assert_eq!(task.status(), TaskState::Created);
}

#[tokio::test]
async fn test_init_moves_to_ready() {
    let task = Task::from_fn(|_ctx: CancellationToken, ()| async move { Ok::<_, TaskError>(()) });

    task.init().await.unwrap();
    assert_eq!(task.status(), TaskState::Ready);
}

#[tokio::test]
async fn test_run_before_init_is_a_precondition_failure() {
    let task = Task::from_fn(|_ctx: CancellationToken, ()| async move { Ok::<_, TaskError>(()) });

    let err = task.run(()).await.unwrap_err();
    assert!(matches!(err, TaskError::Precondition { .. }));
    assert_eq!(task.status(), TaskState::Created);
}

#[tokio::test]
async fn test_run_settles_with_the_functions_value() {
    let task =
        Task::from_fn(|_ctx: CancellationToken, n: u64| async move { Ok::<_, TaskError>(n * 2) });

    task.init().await.unwrap();
    assert_eq!(task.run(21).await.unwrap(), 42);
    assert_eq!(task.status(), TaskState::Completed);
}

#[tokio::test]
async fn test_run_failure_lands_in_error() {
    let task = Task::from_fn(|_ctx: CancellationToken, ()| async move {
        Err::<(), _>(TaskError::Execution {
            error: "boom".into(),
        })
    });

    task.init().await.unwrap();
    let err = task.run(()).await.unwrap_err();
    assert!(matches!(err, TaskError::Execution { .. }));
    assert_eq!(task.status(), TaskState::Error);
}

#[tokio::test]
async fn test_second_run_is_rejected() {
    let task =
        Task::from_fn(|_ctx: CancellationToken, n: u64| async move { Ok::<_, TaskError>(n) });

    task.init().await.unwrap();
    task.run(1).await.unwrap();

    let err = task.run(2).await.unwrap_err();
    assert!(matches!(err, TaskError::Precondition { .. }));
    assert_eq!(task.status(), TaskState::Completed);
}

/// Builds a task whose function reports when it is running, then parks on its
/// cancellation token.
fn stopable_task() -> (
    Arc<Task<impl unitask::Adapter<Args = (), Output = ()>>>,
    mpsc::Receiver<()>,
) {
    let (started_tx, started_rx) = mpsc::channel::<()>(1);
    let task = Task::from_fn(move |ctx: CancellationToken, ()| {
        let started = started_tx.clone();
        async move {
            let _ = started.send(()).await;
            ctx.cancelled().await;
            Err::<(), _>(TaskError::Canceled)
        }
    });
    (Arc::new(task), started_rx)
}

#[tokio::test]
async fn test_status_is_running_while_in_flight() {
    let (task, mut started) = stopable_task();
    task.init().await.unwrap();

    let handle = tokio::spawn({
        let task = Arc::clone(&task);
        async move { task.run(()).await }
    });
    started.recv().await.unwrap();

    assert_eq!(task.status(), TaskState::Running);

    task.abort().await.unwrap();
    let _ = handle.await.unwrap();
}

#[tokio::test]
async fn test_abort_stops_a_cooperative_function() {
    let (task, mut started) = stopable_task();
    task.init().await.unwrap();

    let handle = tokio::spawn({
        let task = Arc::clone(&task);
        async move { task.run(()).await }
    });
    started.recv().await.unwrap();

    task.abort().await.unwrap();
    assert_eq!(task.status(), TaskState::Stopped);

    // The run settles through its own cancellation handling; the state stays
    // where the abort put it.
    let run = handle.await.unwrap();
    assert!(matches!(run.unwrap_err(), TaskError::Canceled));
    assert_eq!(task.status(), TaskState::Stopped);
}

#[tokio::test]
async fn test_abort_outside_running_is_a_no_op() {
    let task = Task::from_fn(|_ctx: CancellationToken, ()| async move { Ok::<_, TaskError>(()) });

    task.abort().await.unwrap();
    assert_eq!(task.status(), TaskState::Created);

    task.init().await.unwrap();
    task.abort().await.unwrap();
    assert_eq!(task.status(), TaskState::Ready);

    task.run(()).await.unwrap();
    task.abort().await.unwrap();
    assert_eq!(task.status(), TaskState::Completed);
}

#[tokio::test]
async fn test_destroy_is_safe_from_any_state_and_repeatable() {
    let task = Task::from_fn(|_ctx: CancellationToken, ()| async move { Ok::<_, TaskError>(()) });

    task.destroy();
    task.init().await.unwrap();
    task.destroy();
    task.run(()).await.unwrap();
    task.destroy();
    task.destroy();

    // Destroy never changes the last observed state.
    assert_eq!(task.status(), TaskState::Completed);
}

#[tokio::test]
async fn test_aborted_function_may_still_finish_with_a_value() {
    // A function that ignores its token entirely: abort resolves, the run
    // keeps going and settles with its value, and the state stays Stopped.
    let (started_tx, mut started) = mpsc::channel::<()>(1);
    let (release_tx, release_rx) = mpsc::channel::<()>(1);
    let release_rx = Arc::new(tokio::sync::Mutex::new(release_rx));

    let task = Task::from_fn(move |_ctx: CancellationToken, ()| {
        let started = started_tx.clone();
        let release = Arc::clone(&release_rx);
        async move {
            let _ = started.send(()).await;
            let _ = release.lock().await.recv().await;
            Ok::<_, TaskError>("done".to_string())
        }
    });
    let task = Arc::new(task);
    task.init().await.unwrap();

    let handle = tokio::spawn({
        let task = Arc::clone(&task);
        async move { task.run(()).await }
    });
    started.recv().await.unwrap();

    task.abort().await.unwrap();
    assert_eq!(task.status(), TaskState::Stopped);

    release_tx.send(()).await.unwrap();
    assert_eq!(handle.await.unwrap().unwrap(), "done");
    assert_eq!(task.status(), TaskState::Stopped);

    // Aborting a task that already settled is the idempotent no-op again.
    task.abort().await.unwrap();
    assert_eq!(task.status(), TaskState::Stopped);
}
