//! # Per-pipeline invocation state.
//!
//! A [`Context`] is built fresh for every handler invocation of every matched
//! subscription: `data` carries the output of the previous stage, while the
//! topic metadata (`pub_event`, `sub_events`) is shared immutably across the
//! whole publish. Contexts are never shared between sibling pipelines, so a
//! mutation in one pipeline is not observable in another.

use std::sync::Arc;

use crate::emitter::handler::Flow;
use crate::error::WorkError;

/// State handed to one pipeline stage.
#[derive(Clone, Debug)]
pub struct Context<T> {
    /// Payload as produced by the previous stage (or the publish call).
    pub data: T,
    /// Normalized topic of the publish that spawned this pipeline.
    pub pub_event: Arc<str>,
    /// Canonical patterns of *every* subscription matched by this publish,
    /// in registration order, deduplicated — not just the one being run.
    pub sub_events: Arc<[Arc<str>]>,
}

impl<T> Context<T> {
    pub(crate) fn new(data: T, pub_event: Arc<str>, sub_events: Arc<[Arc<str>]>) -> Self {
        Self {
            data,
            pub_event,
            sub_events,
        }
    }

    /// Continues the pipeline with the current data unchanged.
    ///
    /// This is the explicit form of "the handler produced no new value":
    /// the previous data propagates as-is, never an empty placeholder.
    pub fn next(self) -> Result<Flow<T>, WorkError> {
        Ok(Flow::Next(self.data))
    }

    /// Ends the pipeline, making the current data the final value.
    ///
    /// Equivalent to returning `Ok(Flow::End(self.data))`. Ending is local
    /// to this pipeline; sibling pipelines of the same publish keep running.
    pub fn end(self) -> Result<Flow<T>, WorkError> {
        Ok(Flow::End(self.data))
    }
}
