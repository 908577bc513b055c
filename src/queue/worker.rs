//! # Worker abstraction for the task queue.
//!
//! This module defines the [`Worker`] trait (async, fallible) and a
//! function-backed implementation [`WorkerFn`]. The common handle type is
//! [`WorkerRef`], an `Arc<dyn Worker<T, R>>` shared by the queue across all
//! submissions.
//!
//! A worker turns one task payload into one result. It may be slow and may
//! suspend; the queue guarantees that at most `max_runners` invocations are
//! in flight at once.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::WorkError;

/// Shared handle to a worker (`Arc<dyn Worker<T, R>>`).
pub type WorkerRef<T, R> = Arc<dyn Worker<T, R>>;

/// # Asynchronous task worker.
///
/// Invoked by [`TaskQueue`](crate::TaskQueue) for each admitted submission.
/// Errors are delivered back to the submitting caller through
/// [`TaskQueue::add`](crate::TaskQueue::add); they never unwind.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use pipebus::{Worker, WorkError};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Worker<String, String> for Echo {
///     async fn run(&self, task: String) -> Result<String, WorkError> {
///         Ok(task)
///     }
/// }
/// ```
#[async_trait]
pub trait Worker<T, R>: Send + Sync + 'static
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Executes one task to completion.
    async fn run(&self, task: T) -> Result<R, WorkError>;
}

/// Function-backed worker implementation.
///
/// Wraps a closure that *creates* a new future per task, so each invocation
/// owns its own state.
pub struct WorkerFn<F> {
    f: F,
}

impl<F> WorkerFn<F> {
    /// Creates a new function-backed worker.
    ///
    /// Prefer [`WorkerFn::arc`] when you immediately need a [`WorkerRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the worker and returns it as a shared handle.
    ///
    /// # Example
    /// ```
    /// use pipebus::{TaskQueue, WorkerFn};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let queue = TaskQueue::new(WorkerFn::arc(|task: u32| async move { Ok(task * 2) }));
    /// assert_eq!(queue.add(21).await.ok(), Some(42));
    /// # }
    /// ```
    pub fn arc<T, R>(f: F) -> WorkerRef<T, R>
    where
        Self: Worker<T, R>,
        T: Send + 'static,
        R: Send + 'static,
    {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<T, R, F, Fut> Worker<T, R> for WorkerFn<F>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, WorkError>> + Send + 'static,
{
    async fn run(&self, task: T) -> Result<R, WorkError> {
        (self.f)(task).await
    }
}
