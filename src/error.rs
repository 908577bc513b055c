//! Error types used by the emitter, pipelines and queue workers.
//!
//! This module defines two main error enums:
//!
//! - [`EmitterError`] — misuse of the emitter's own configuration surface.
//! - [`WorkError`] — failures raised by user-supplied work units (pipeline
//!   handlers and queue workers).
//!
//! The propagation policy is asymmetric: `EmitterError` is returned to the
//! caller that misused the API, while `WorkError` is always contained at the
//! smallest enclosing unit of work (one pipeline, one task) and reported
//! through that unit's normal return channel.

use std::any::Any;

use thiserror::Error;

/// # Errors produced by the emitter's configuration surface.
///
/// These represent misuse of the core itself, not failures of user code.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EmitterError {
    /// `initialize` was called more than once without an intervening `reset`.
    #[error("emitter is already initialized; call reset() before initializing again")]
    AlreadyInitialized,
}

impl EmitterError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pipebus::EmitterError;
    ///
    /// assert_eq!(EmitterError::AlreadyInitialized.as_label(), "already_initialized");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EmitterError::AlreadyInitialized => "already_initialized",
        }
    }
}

/// # Failures raised inside user-supplied work units.
///
/// Produced by pipeline handlers and queue workers. A `WorkError` never
/// crosses its unit boundary: a failing handler halts only its own pipeline,
/// and a failing worker is reported as the `Err` arm of
/// [`TaskQueue::add`](crate::TaskQueue::add).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkError {
    /// The handler or worker returned an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The handler or worker panicked; the panic was caught and converted.
    #[error("panicked: {info}")]
    Panicked {
        /// Extracted panic payload (best effort).
        info: String,
    },
}

impl WorkError {
    /// Creates a [`WorkError::Fail`] from any displayable error.
    pub fn fail(error: impl Into<String>) -> Self {
        WorkError::Fail { error: error.into() }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkError::Fail { .. } => "work_failed",
            WorkError::Panicked { .. } => "work_panicked",
        }
    }
}

/// Extracts a readable message from a caught panic payload.
///
/// Panic payloads are `&'static str` or `String` in practice; anything else
/// is reported as "unknown panic".
pub(crate) fn panic_info(payload: Box<dyn Any + Send>) -> String {
    let any = &*payload;
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
