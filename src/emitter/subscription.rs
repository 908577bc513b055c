//! # Chained subscription handle.
//!
//! [`Subscription`] is what [`Emitter::subscribe`](crate::Emitter::subscribe)
//! returns. Calling [`Subscription::subscribe`] registers another pattern in
//! the **same group** and returns a handle referencing the extended group, so
//! a chain of subscriptions can be torn down with a single
//! [`Subscription::unsubscribe`].
//!
//! ## Lifecycle
//! ```text
//! active ──unsubscribe()──► unsubscribed        (terminal)
//! ```
//! `unsubscribe` removes every record in the group atomically; calling it any
//! number of times after the first has no further effect.

use crate::emitter::core::Emitter;
use crate::emitter::handler::HandlerRef;

/// Handle to one group of chained subscriptions.
///
/// The handle does not unsubscribe on drop; tearing down a subscription is
/// always an explicit call.
#[derive(Clone)]
pub struct Subscription<T> {
    emitter: Emitter<T>,
    group: u64,
}

impl<T> Subscription<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn new(emitter: Emitter<T>, group: u64) -> Self {
        Self { emitter, group }
    }

    /// Adds another pattern to this group.
    ///
    /// The returned handle references the same group as `self`; unsubscribing
    /// through either removes all chained records.
    ///
    /// # Example
    /// ```
    /// use pipebus::{Context, Emitter, HandlerFn};
    ///
    /// let bus: Emitter<String> = Emitter::new();
    /// let sub = bus
    ///     .subscribe("orders/created", vec![HandlerFn::arc(|ctx: Context<String>| async move { ctx.next() })])
    ///     .subscribe("orders/cancelled", vec![HandlerFn::arc(|ctx: Context<String>| async move { ctx.next() })]);
    ///
    /// sub.unsubscribe(); // removes both
    /// ```
    pub fn subscribe(&self, pattern: &str, handlers: Vec<HandlerRef<T>>) -> Subscription<T> {
        self.emitter.subscribe_in_group(pattern, handlers, self.group)
    }

    /// Removes every record in this group. Idempotent.
    pub fn unsubscribe(&self) {
        self.emitter.unregister_group(self.group);
    }
}
