//! Bounded-concurrency task runner.
//!
//! This module is standalone: it has no dependency on the emitter. An
//! unbounded stream of submissions flows through a fixed number of runner
//! slots, and every submission gets its result back through the normal
//! return channel — task failures are values here, never unwinds.
//!
//! ## Contents
//! - [`TaskQueue`] the queue itself (`add` + semaphore-capped execution)
//! - [`Worker`], [`WorkerFn`], [`WorkerRef`] the work function abstraction
//! - [`QueueConfig`] runner-count configuration

mod config;
mod task_queue;
mod worker;

pub use config::QueueConfig;
pub use task_queue::TaskQueue;
pub use worker::{Worker, WorkerFn, WorkerRef};
