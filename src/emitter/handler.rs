//! # Pipeline stage abstraction (`Handler`, `HandlerFn`, `Flow`).
//!
//! This module defines the [`Handler`] trait (async, fallible) and a
//! convenient function-backed implementation [`HandlerFn`]. The common handle
//! type is [`HandlerRef`], an `Arc<dyn Handler<T>>` suitable for sharing
//! between the registry and in-flight pipelines.
//!
//! A handler receives a [`Context`] and returns a [`Flow`]: either *continue
//! the pipeline with this data* or *end the pipeline with this data*. The
//! dispatcher loop inspects the tag; there is no hidden control-flow closure.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::emitter::context::Context;
use crate::error::WorkError;

/// Control-flow outcome of one handler invocation.
///
/// The value carried by either variant becomes the pipeline's current data:
/// [`Flow::Next`] hands it to the next stage, [`Flow::End`] makes it the
/// final value and prevents any remaining stage in *this* pipeline from
/// running. Sibling pipelines of the same publish are unaffected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Flow<T> {
    /// Continue with this data.
    Next(T),
    /// Stop this pipeline; this value is final.
    End(T),
}

/// Boxed future returned by [`Handler::call`].
pub type HandlerFuture<T> = Pin<Box<dyn Future<Output = Result<Flow<T>, WorkError>> + Send>>;

/// Shared handle to a pipeline stage (`Arc<dyn Handler<T>>`).
pub type HandlerRef<T> = Arc<dyn Handler<T>>;

/// # Asynchronous pipeline stage.
///
/// Stages run strictly in order within one pipeline; a stage only starts
/// after the previous one has settled. Returning `Err` halts the pipeline at
/// this stage (contained, see [`WorkError`]).
///
/// # Example
/// ```
/// use pipebus::{Context, Flow, Handler, HandlerFuture, WorkError};
///
/// struct Doubler;
///
/// impl Handler<i64> for Doubler {
///     fn call(&self, ctx: Context<i64>) -> HandlerFuture<i64> {
///         Box::pin(async move { Ok(Flow::Next(ctx.data * 2)) })
///     }
/// }
/// ```
pub trait Handler<T>: Send + Sync + 'static {
    /// Processes one context, producing the next control-flow step.
    fn call(&self, ctx: Context<T>) -> HandlerFuture<T>;
}

/// Function-backed handler implementation.
///
/// Wraps a closure that *creates* a new future per invocation, so each call
/// owns its own state; shared state goes through an explicit `Arc` inside
/// the closure.
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle.
    ///
    /// # Example
    /// ```
    /// use pipebus::{Context, Flow, HandlerFn, HandlerRef};
    ///
    /// let h: HandlerRef<i32> = HandlerFn::arc(|ctx: Context<i32>| async move {
    ///     Ok(Flow::Next(ctx.data + 1))
    /// });
    /// ```
    pub fn arc<T>(f: F) -> HandlerRef<T>
    where
        Self: Handler<T>,
    {
        Arc::new(Self::new(f))
    }
}

impl<T, F, Fut> Handler<T> for HandlerFn<F>
where
    T: Send + 'static,
    F: Fn(Context<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Flow<T>, WorkError>> + Send + 'static,
{
    fn call(&self, ctx: Context<T>) -> HandlerFuture<T> {
        Box::pin((self.f)(ctx))
    }
}
