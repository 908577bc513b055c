//! # Task queue configuration.
//!
//! Provides [`QueueConfig`], the runner-count knob for [`TaskQueue`](crate::TaskQueue).
//!
//! ## Sentinel values
//! - `max_runners = 0` is treated as 1 (clamped); the queue always has at
//!   least one runner slot.

/// Configuration for a [`TaskQueue`](crate::TaskQueue).
///
/// ## Field semantics
/// - `max_runners`: upper bound on concurrently running worker invocations.
///   Submissions beyond the cap wait in FIFO admission order.
#[derive(Clone, Copy, Debug)]
pub struct QueueConfig {
    /// Maximum number of worker invocations in flight at any instant.
    pub max_runners: usize,
}

impl QueueConfig {
    /// Returns the runner cap clamped to a minimum of 1.
    ///
    /// The queue uses this value to size its semaphore, so a zero
    /// configuration cannot deadlock every submission.
    #[inline]
    pub fn max_runners_clamped(&self) -> usize {
        self.max_runners.max(1)
    }
}

impl Default for QueueConfig {
    /// Default configuration: `max_runners = 10`.
    fn default() -> Self {
        Self { max_runners: 10 }
    }
}
