//! Effects and Responses
//!
//! An [`Effect`] is what a producer hands back after a change was detected:
//! either nothing to do, or a pending asynchronous result. The variant is
//! chosen by the producer's return value, never by inspecting it at runtime.
//!
//! A [`Response`] is the deferred completion of one responder call. It
//! resolves once the effect settled and the matching event was dispatched,
//! or immediately when there was no effect. It never fails: a rejected
//! effect becomes a failure event, not an error for the caller.
//!
//! # Laziness
//!
//! Rust futures do nothing until polled. The producer itself runs inside
//! `call`, but the effect body and the event dispatch run only while the
//! `Response` is driven, either by awaiting it or by spawning it (which is
//! what the connector does).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::{self, BoxFuture, FutureExt};

/// The outcome of invoking an effect producer.
pub enum Effect<T, R> {
    /// No effect to run for this change. Nothing will be dispatched.
    NoEffect,

    /// A pending result. Exactly one event is dispatched when it settles.
    Pending(BoxFuture<'static, Result<T, R>>),
}

impl<T, R> Effect<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// No effect this time.
    pub fn none() -> Self {
        Self::NoEffect
    }

    /// Wrap a future as a pending effect.
    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, R>> + Send + 'static,
    {
        Self::Pending(fut.boxed())
    }

    /// An effect that has already succeeded with `value`.
    pub fn ok(value: T) -> Self {
        Self::Pending(future::ready(Ok(value)).boxed())
    }

    /// An effect that has already failed with `reason`.
    pub fn err(reason: R) -> Self {
        Self::Pending(future::ready(Err(reason)).boxed())
    }

    /// Returns true if this is a pending result.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl<T, R, F> From<Option<F>> for Effect<T, R>
where
    F: Future<Output = Result<T, R>> + Send + 'static,
    T: Send + 'static,
    R: Send + 'static,
{
    fn from(fut: Option<F>) -> Self {
        match fut {
            Some(fut) => Self::pending(fut),
            None => Self::NoEffect,
        }
    }
}

impl<T, R> fmt::Debug for Effect<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEffect => f.write_str("NoEffect"),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Deferred completion of a responder call.
///
/// Resolves to `()` once the effect's event has been dispatched, or
/// immediately when no effect was started.
#[must_use = "a Response does nothing unless awaited or spawned"]
pub struct Response {
    inner: Option<BoxFuture<'static, ()>>,
}

impl Response {
    /// A response that is already complete.
    pub fn noop() -> Self {
        Self { inner: None }
    }

    pub(crate) fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self { inner: Some(fut.boxed()) }
    }

    /// Returns true if no effect was started, so there is nothing to drive.
    pub fn is_noop(&self) -> bool {
        self.inner.is_none()
    }
}

impl Future for Response {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match self.inner.as_mut() {
            None => Poll::Ready(()),
            Some(fut) => {
                let poll = fut.poll_unpin(cx);
                if poll.is_ready() {
                    self.inner = None;
                }
                poll
            }
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("noop", &self.is_noop())
            .finish()
    }
}
