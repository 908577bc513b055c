//! # Emitter: the subscribe/publish façade over registry and dispatcher.
//!
//! [`Emitter`] owns the topic [`Registry`] and the global middleware chain,
//! and turns every publish into one concurrent pipeline per matched
//! subscription.
//!
//! ## Dispatch flow
//! ```text
//! publish(topic, data)
//!   ├─ normalize topic into segments + canonical form
//!   ├─ snapshot under read locks:
//!   │    matched   = registry.matches(segments)      (registration order)
//!   │    chain     = installed middlewares (or none)
//!   ├─ sub_events = deduplicated canonical patterns of `matched`
//!   └─ join_all( pipeline::run(chain + record.handlers, data.clone(), ...) )
//!        one pipeline per matched record; failures contained per pipeline
//! ```
//!
//! ## Rules
//! - **Snapshot-at-dispatch**: subscribing or unsubscribing while a publish
//!   is in flight never changes that publish's `sub_events` or the set of
//!   pipelines already spawned for it.
//! - **No locks across awaits**: both locks are released before any user
//!   code runs.
//! - **Zero-subscriber publish** is a legal no-op that resolves immediately.
//! - `initialize` may be called **at most once**; `reset` re-arms it.
//!
//! The emitter is an explicit, freely constructible instance; `Clone` shares
//! the underlying state, so independent components can hold cheap handles to
//! one bus while tests construct a private instance each.

use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;

use crate::emitter::handler::HandlerRef;
use crate::emitter::pipeline;
use crate::emitter::scope::{self, Scope};
use crate::emitter::subscription::Subscription;
use crate::error::EmitterError;
use crate::topics::pattern::{split_topic, Pattern};
use crate::topics::registry::Registry;

struct Shared<T> {
    registry: RwLock<Registry<T>>,
    /// `None` until `initialize`; an installed-but-empty chain is `Some`.
    middlewares: RwLock<Option<Arc<[HandlerRef<T>]>>>,
}

/// In-process publish/subscribe engine with per-subscription pipelines.
///
/// # Example
/// ```
/// use pipebus::{Context, Emitter, Flow, HandlerFn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bus: Emitter<i32> = Emitter::new();
///
/// let sub = bus.subscribe(
///     "sensor/*/reading",
///     vec![
///         HandlerFn::arc(|ctx: Context<i32>| async move { Ok(Flow::Next(ctx.data + 1)) }),
///         HandlerFn::arc(|ctx: Context<i32>| async move {
///             assert_eq!(ctx.data, 42);
///             assert_eq!(ctx.pub_event.as_ref(), "sensor/a1/reading");
///             ctx.next()
///         }),
///     ],
/// );
///
/// bus.publish("/sensor/a1/reading/", 41).await;
/// sub.unsubscribe();
/// # }
/// ```
pub struct Emitter<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Emitter<T>
where
    T: Clone + Send + 'static,
{
    /// Creates an empty emitter: no subscriptions, no middlewares installed.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: RwLock::new(Registry::new()),
                middlewares: RwLock::new(None),
            }),
        }
    }

    /// Installs the ordered global middleware chain.
    ///
    /// Middlewares run, in order, before every subscription's own handlers.
    /// Publishing and subscribing before initialization is legal and runs
    /// with zero middlewares.
    ///
    /// # Errors
    /// [`EmitterError::AlreadyInitialized`] if called a second time without
    /// an intervening [`reset`](Emitter::reset); the installed chain is never
    /// silently replaced.
    pub fn initialize(&self, middlewares: Vec<HandlerRef<T>>) -> Result<(), EmitterError> {
        let mut slot = self.shared.middlewares.write();
        if slot.is_some() {
            return Err(EmitterError::AlreadyInitialized);
        }
        *slot = Some(middlewares.into());
        Ok(())
    }

    /// Registers `handlers` (an ordered pipeline tail) under `pattern`.
    ///
    /// Returns a [`Subscription`] handle; chain further `subscribe` calls on
    /// it to group subscriptions that must be removed together. An empty
    /// handler list is permitted — the pipeline is then the middleware chain
    /// alone.
    pub fn subscribe(&self, pattern: &str, handlers: Vec<HandlerRef<T>>) -> Subscription<T> {
        let group = self.shared.registry.write().next_group();
        self.subscribe_in_group(pattern, handlers, group)
    }

    pub(crate) fn subscribe_in_group(
        &self,
        pattern: &str,
        handlers: Vec<HandlerRef<T>>,
        group: u64,
    ) -> Subscription<T> {
        self.shared
            .registry
            .write()
            .register(Pattern::parse(pattern), handlers.into(), group);
        Subscription::new(self.clone(), group)
    }

    pub(crate) fn unregister_group(&self, group: u64) {
        self.shared.registry.write().unregister_group(group);
    }

    /// Publishes `data` on `topic` and resolves once **every** spawned
    /// pipeline has settled, successfully or via contained failure.
    ///
    /// Each matched subscription gets its own pipeline seeded with a clone of
    /// `data`; pipelines run concurrently with respect to each other, while
    /// stages within one pipeline stay strictly sequential. Handler failures
    /// are contained per pipeline and never surface here.
    pub async fn publish(&self, topic: &str, data: T) {
        let segments = split_topic(topic);
        let pub_event: Arc<str> = segments.join("/").into();

        // Snapshot before running any user code; mid-dispatch mutations must
        // not affect this publish.
        let (matched, chain) = {
            let registry = self.shared.registry.read();
            let chain = self
                .shared
                .middlewares
                .read()
                .clone()
                .unwrap_or_else(|| Vec::new().into());
            (registry.matches(&segments), chain)
        };

        if matched.is_empty() {
            return;
        }

        // Matched pattern strings, deduplicated but kept in match order.
        let mut seen: Vec<Arc<str>> = Vec::with_capacity(matched.len());
        for m in &matched {
            if !seen.iter().any(|p| p.as_ref() == m.pattern.as_ref()) {
                seen.push(m.pattern.clone());
            }
        }
        let sub_events: Arc<[Arc<str>]> = seen.into();

        let pipelines = matched.into_iter().map(|m| {
            pipeline::run(
                chain.clone(),
                m.handlers,
                data.clone(),
                pub_event.clone(),
                sub_events.clone(),
            )
        });
        join_all(pipelines).await;
    }

    /// Clears all subscriptions and middleware state and re-arms
    /// [`initialize`](Emitter::initialize).
    ///
    /// A controlled teardown hook for tests and lifecycle management, not
    /// part of steady-state operation. In-flight publishes keep their
    /// dispatch-time snapshots.
    pub fn reset(&self) {
        self.shared.registry.write().clear();
        *self.shared.middlewares.write() = None;
    }

    /// Mints a fresh [`Scope`] for namespacing topics.
    ///
    /// Scopes from separate calls never collide; [`Scope::of`] prefixes the
    /// token, [`un_scope`](crate::un_scope) strips it.
    pub fn get_scope(&self) -> Scope {
        Scope::mint()
    }

    /// Strips a recognized scope token from `topic`, if present.
    ///
    /// Identity for topics without a token; exact inverse of [`Scope::of`].
    pub fn un_scope<'a>(&self, topic: &'a str) -> &'a str {
        scope::un_scope(topic)
    }

    /// Number of live subscription records (chained records count
    /// individually).
    pub fn subscription_count(&self) -> usize {
        self.shared.registry.read().len()
    }
}

impl<T> Default for Emitter<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
