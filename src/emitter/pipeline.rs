//! # Sequential execution of one middleware + handler chain.
//!
//! One pipeline serves one matched subscription of one publish: the global
//! middleware chain runs first, then the subscription's own handlers, each
//! stage waiting for the previous to settle.
//!
//! ## Rules
//! - **Strict sequencing**: stages of one pipeline never overlap.
//! - **Short-circuit**: [`Flow::End`] stops the pipeline; its value is final.
//! - **Containment**: a stage `Err` or panic halts only this pipeline — the
//!   failure is logged and swallowed, never propagated to the publisher or
//!   to sibling pipelines.
//!
//! Panic isolation uses `catch_unwind` on the stage future; shared state a
//! stage was mutating when it panicked may be left mid-update.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::warn;

use crate::emitter::context::Context;
use crate::emitter::handler::{Flow, HandlerRef};
use crate::error::panic_info;

/// Runs the middleware chain followed by the subscription's handlers.
///
/// Returns the final data when the pipeline completed or ended early, and
/// `None` when a stage failed or panicked.
pub(crate) async fn run<T>(
    middlewares: Arc<[HandlerRef<T>]>,
    handlers: Arc<[HandlerRef<T>]>,
    seed: T,
    pub_event: Arc<str>,
    sub_events: Arc<[Arc<str>]>,
) -> Option<T>
where
    T: Send + 'static,
{
    let mut data = seed;

    for stage in middlewares.iter().chain(handlers.iter()) {
        let ctx = Context::new(data, pub_event.clone(), sub_events.clone());
        let fut = stage.call(ctx);

        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(Flow::Next(next))) => data = next,
            Ok(Ok(Flow::End(last))) => return Some(last),
            Ok(Err(err)) => {
                warn!(topic = %pub_event, label = err.as_label(), %err, "pipeline stage failed; halting this pipeline");
                return None;
            }
            Err(payload) => {
                let info = panic_info(payload);
                warn!(topic = %pub_event, %info, "pipeline stage panicked; halting this pipeline");
                return None;
            }
        }
    }

    Some(data)
}
