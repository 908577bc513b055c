//! Pipeline dispatcher: emitter façade, contexts, handlers, scoping.
//!
//! This module contains the publish/subscribe engine built on top of the
//! topic registry.
//!
//! ## Contents
//! - [`Emitter`] subscribe/publish/initialize/reset façade
//! - [`Subscription`] chained subscription handle (group lifecycle)
//! - [`Context`], [`Flow`] per-stage state and tagged control flow
//! - [`Handler`], [`HandlerFn`], [`HandlerRef`] pipeline stage abstraction
//! - [`Scope`], [`un_scope`] private topic namespaces
//!
//! See `core.rs` for the dispatch-flow diagram.

mod context;
mod core;
mod handler;
mod pipeline;
mod scope;
mod subscription;

pub use context::Context;
pub use self::core::Emitter;
pub use handler::{Flow, Handler, HandlerFn, HandlerFuture, HandlerRef};
pub use scope::{un_scope, Scope};
pub use subscription::Subscription;
