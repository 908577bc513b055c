//! # pipebus
//!
//! **pipebus** is an in-process publish/subscribe engine for Rust with
//! hierarchical, glob-capable topic matching, composable per-subscription
//! handler pipelines, global middlewares, and a companion bounded-concurrency
//! task queue. Independent producers and consumers communicate by topic name
//! without holding references to each other.
//!
//! ## Architecture
//! ```text
//!  publish("a/b", data)
//!        │
//!        ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │ Emitter                                                   │
//! │  - normalize topic ("/a//b/" ≡ "a/b")                     │
//! │  - Registry: which patterns match? (registration order)   │
//! │  - snapshot: matched records + middleware chain           │
//! └──────┬──────────────────────┬─────────────────────────────┘
//!        ▼                      ▼
//! ┌──────────────┐       ┌──────────────┐
//! │ pipeline #1  │  ...  │ pipeline #N  │     one per matched subscription,
//! │ middlewares  │       │ middlewares  │     joined concurrently
//! │   then       │       │   then       │
//! │ handlers     │       │ handlers     │     strictly sequential stages
//! └──────────────┘       └──────────────┘
//!
//! Each stage receives a Context { data, pub_event, sub_events } and returns
//! Flow::Next(data) or Flow::End(data). Errors and panics halt only their
//! own pipeline; publish() resolves once every pipeline has settled.
//! ```
//!
//! ## Features
//! | Area              | Description                                                         | Key types / traits                    |
//! |-------------------|---------------------------------------------------------------------|----------------------------------------|
//! | **Topics**        | Segment-wise matching with `*` / terminal `**` wildcards.          | [`Emitter`], [`Subscription`]          |
//! | **Pipelines**     | Ordered middlewares + handlers, tagged control flow, containment.  | [`Handler`], [`HandlerFn`], [`Flow`]   |
//! | **Scoping**       | Collision-free private topic namespaces.                           | [`Scope`], [`un_scope`]                |
//! | **Task queue**    | Fixed runner slots, FIFO admission, results never unwind.          | [`TaskQueue`], [`Worker`], [`WorkerFn`]|
//! | **Errors**        | Typed errors for config misuse and contained user-code failures.   | [`EmitterError`], [`WorkError`]        |
//!
//! ## Example
//! ```rust
//! use pipebus::{Context, Emitter, Flow, HandlerFn, QueueConfig, TaskQueue, WorkerFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus: Emitter<u64> = Emitter::new();
//!
//!     // Global middlewares run before every subscription's own handlers.
//!     bus.initialize(vec![HandlerFn::arc(|ctx: Context<u64>| async move {
//!         Ok(Flow::Next(ctx.data + 1))
//!     })])?;
//!
//!     let sub = bus.subscribe(
//!         "metrics/*/sample",
//!         vec![HandlerFn::arc(|ctx: Context<u64>| async move {
//!             assert_eq!(ctx.data, 42);
//!             ctx.next()
//!         })],
//!     );
//!
//!     bus.publish("metrics/cpu/sample", 41).await;
//!     sub.unsubscribe();
//!
//!     // The task queue is standalone: at most `max_runners` workers in flight.
//!     let queue = TaskQueue::with_config(
//!         WorkerFn::arc(|task: u64| async move { Ok(task * 2) }),
//!         QueueConfig { max_runners: 2 },
//!     );
//!     assert_eq!(queue.add(21).await.ok(), Some(42));
//!     Ok(())
//! }
//! ```

mod emitter;
mod error;
mod queue;
mod topics;

// ---- Public re-exports ----

pub use emitter::{
    un_scope, Context, Emitter, Flow, Handler, HandlerFn, HandlerFuture, HandlerRef, Scope,
    Subscription,
};
pub use error::{EmitterError, WorkError};
pub use queue::{QueueConfig, TaskQueue, Worker, WorkerFn, WorkerRef};
