//! # Bounded-concurrency task queue.
//!
//! [`TaskQueue`] executes an unbounded stream of submitted tasks through a
//! fixed number of runner slots, never exceeding the configured concurrency.
//!
//! ## Architecture
//! ```text
//! add(task_1) ──┐
//! add(task_2) ──┼──► fair semaphore (max_runners permits) ──► worker.run(task)
//! add(task_n) ──┘         │                                        │
//!                    FIFO admission                      result ───┘
//!                                                 (returned to the submitting caller)
//! ```
//!
//! ## Rules
//! - **Cap**: at any instant, in-flight worker invocations ≤ `max_runners`.
//! - **FIFO admission**: waiting submissions start in submission order; they
//!   may *complete* out of order depending on individual durations.
//! - **No cross-talk**: each `add` resolves with the result of its own
//!   payload.
//! - **No unwinding**: worker errors come back as `Err`; worker panics are
//!   caught and reported as [`WorkError::Panicked`]. `add` itself never
//!   panics for a task-level failure.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::error::{panic_info, WorkError};
use crate::queue::config::QueueConfig;
use crate::queue::worker::WorkerRef;

/// Semaphore-capped task runner.
///
/// Cheap to clone; clones share the worker and the runner slots.
pub struct TaskQueue<T, R> {
    worker: WorkerRef<T, R>,
    permits: Arc<Semaphore>,
}

impl<T, R> Clone for TaskQueue<T, R> {
    fn clone(&self) -> Self {
        Self {
            worker: self.worker.clone(),
            permits: self.permits.clone(),
        }
    }
}

impl<T, R> TaskQueue<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Creates a queue with the default configuration (`max_runners = 10`).
    pub fn new(worker: WorkerRef<T, R>) -> Self {
        Self::with_config(worker, QueueConfig::default())
    }

    /// Creates a queue with an explicit runner cap.
    ///
    /// `max_runners` is clamped to a minimum of 1, see
    /// [`QueueConfig::max_runners_clamped`].
    pub fn with_config(worker: WorkerRef<T, R>, cfg: QueueConfig) -> Self {
        Self {
            worker,
            permits: Arc::new(Semaphore::new(cfg.max_runners_clamped())),
        }
    }

    /// Submits one task and waits for its result.
    ///
    /// Waits for a runner slot (FIFO among waiting submissions), runs the
    /// worker, and returns its result. When a slot frees, the next waiting
    /// submission is admitted immediately.
    ///
    /// # Errors
    /// - The worker's own `Err` is passed through unchanged.
    /// - A worker panic is caught and reported as [`WorkError::Panicked`];
    ///   the slot is released and the queue stays usable.
    pub async fn add(&self, task: T) -> Result<R, WorkError> {
        // The semaphore is owned by this queue and never closed, so acquire
        // can only fail if every clone of the queue has been dropped, which
        // cannot happen while `self` is borrowed.
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_closed) => return Err(WorkError::fail("queue semaphore closed")),
        };

        match AssertUnwindSafe(self.worker.run(task)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                let info = panic_info(payload);
                warn!(%info, "queue worker panicked; reporting to the submitter");
                Err(WorkError::Panicked { info })
            }
        }
    }

    /// Number of currently free runner slots.
    pub fn available_runners(&self) -> usize {
        self.permits.available_permits()
    }
}
