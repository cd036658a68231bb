//! Responder Implementation
//!
//! A Responder watches a tuple of values derived from state and runs an
//! asynchronous effect once per detected change, turning the effect's outcome
//! into an event for the container.
//!
//! # How Responders Work
//!
//! 1. `call` evaluates the responder's selector against the given state.
//!
//! 2. If the selector's version equals the last version this responder saw,
//!    nothing changed and `call` returns a no-op [`Response`].
//!
//! 3. Otherwise the responder records the new version, then invokes its
//!    producer with the derived values.
//!
//! 4. [`Effect::NoEffect`] yields a no-op response. A pending effect yields a
//!    response that awaits it and dispatches `on_success(value)` or
//!    `on_failure(reason)`.
//!
//! Steps 1-3 run synchronously inside `call`. The version is recorded before
//! the producer runs, so a second call that arrives while the first effect is
//! still pending does not detect the same change again. It does detect a new
//! change, and both effects then run side by side with no ordering between
//! their events.
//!
//! A panic inside the producer is not caught and unwinds out of `call`.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use tracing::Instrument;

use super::effect::{Effect, Response};
use super::projection::{Produce, Projections};
use super::selector::{Selector, Version};

/// A cloneable handle that delivers events to a container.
pub struct Dispatcher<E> {
    inner: Arc<dyn Fn(E) + Send + Sync>,
}

impl<E> Dispatcher<E> {
    /// Wrap a dispatch function.
    pub fn new<F>(dispatch: F) -> Self
    where
        F: Fn(E) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(dispatch),
        }
    }

    /// Deliver one event.
    pub fn dispatch(&self, event: E) {
        (self.inner)(event);
    }
}

impl<E> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

/// Object-safe view of a responder, so responders with different
/// projections can be connected together.
pub trait Respond<S, E>: Send + Sync {
    /// Observe `state` and start an effect if the derived values changed.
    fn call(&self, state: &S, dispatch: &Dispatcher<E>) -> Response;

    /// Number of recomputations of the underlying selector.
    fn recomputations(&self) -> u64;

    /// Forget everything observed so far. The next call detects a change.
    fn reset_recomputations(&self);

    /// Label used in log output.
    fn name(&self) -> &'static str;
}

/// How an effect settled, carrying the event built for it.
enum Settled<E> {
    Succeeded(E),
    Failed(E),
}

type Start<V, E> = dyn Fn(V) -> Option<BoxFuture<'static, Settled<E>>> + Send + Sync;

/// A memoizing bridge from derived state to an asynchronous effect.
///
/// # Example
///
/// ```rust,ignore
/// let responder = Responder::new(
///     (|s: &State| s.value,),
///     |value: &'static str| Effect::<bool, ()>::ok(value == "happy"),
///     |is_happy: bool| Event::EvaluateHappiness { is_happy },
///     |_: ()| Event::Failed,
/// );
///
/// responder.call(&state, &dispatcher).await;
/// ```
pub struct Responder<S, E, P>
where
    P: Projections<S>,
{
    name: &'static str,

    selector: Selector<S, P>,

    /// Version of the selector seen by the last call that detected a change.
    last_seen: Mutex<Version>,

    /// The producer composed with both event constructors.
    start: Box<Start<P::Values, E>>,

    _event: PhantomData<fn() -> E>,
}

impl<S, E, P> Responder<S, E, P>
where
    P: Projections<S>,
    E: Send + 'static,
{
    /// Create a responder.
    ///
    /// `produce` receives the values from `projections` as positional
    /// arguments. `on_success` and `on_failure` build the event dispatched
    /// when the effect resolves or rejects.
    pub fn new<G, T, R, OnOk, OnErr>(
        projections: P,
        produce: G,
        on_success: OnOk,
        on_failure: OnErr,
    ) -> Self
    where
        G: Produce<P::Values, T, R>,
        T: Send + 'static,
        R: Send + 'static,
        OnOk: Fn(T) -> E + Send + Sync + 'static,
        OnErr: Fn(R) -> E + Send + Sync + 'static,
    {
        let on_success = Arc::new(on_success);
        let on_failure = Arc::new(on_failure);

        let start = move |values: P::Values| match produce.produce(values) {
            Effect::NoEffect => None,
            Effect::Pending(fut) => {
                let on_success = Arc::clone(&on_success);
                let on_failure = Arc::clone(&on_failure);
                Some(
                    async move {
                        match fut.await {
                            Ok(value) => Settled::Succeeded(on_success(value)),
                            Err(reason) => Settled::Failed(on_failure(reason)),
                        }
                    }
                    .boxed(),
                )
            }
        };

        let selector = Selector::new(projections);
        let last_seen = Mutex::new(selector.version());

        Self {
            name: "responder",
            selector,
            last_seen,
            start: Box::new(start),
            _event: PhantomData,
        }
    }

    /// Set the label used in log output.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Observe `state`, starting the effect if the derived values changed.
    ///
    /// The returned [`Response`] must be awaited or spawned for the effect to
    /// run and its event to be dispatched.
    pub fn call(&self, state: &S, dispatch: &Dispatcher<E>) -> Response {
        let values = {
            let mut last_seen = self.last_seen.lock();
            let eval = self.selector.evaluate(state);
            if eval.version == *last_seen {
                tracing::trace!(responder = self.name, version = eval.version.get(), "no change");
                return Response::noop();
            }
            *last_seen = eval.version;
            tracing::debug!(
                responder = self.name,
                selector = self.selector.id(),
                version = eval.version.get(),
                "change detected"
            );
            eval.values
        };

        let Some(effect) = (self.start)(values) else {
            tracing::debug!(responder = self.name, "no effect to run");
            return Response::noop();
        };

        let dispatch = dispatch.clone();
        let span = tracing::debug_span!("effect", responder = self.name);
        Response::from_future(
            async move {
                match effect.await {
                    Settled::Succeeded(event) => {
                        tracing::debug!("effect succeeded, dispatching success event");
                        dispatch.dispatch(event);
                    }
                    Settled::Failed(event) => {
                        tracing::debug!("effect failed, dispatching failure event");
                        dispatch.dispatch(event);
                    }
                }
            }
            .instrument(span),
        )
    }

    /// Number of recomputations of the underlying selector.
    pub fn recomputations(&self) -> u64 {
        self.selector.recomputations()
    }

    /// Reset the selector and the last seen version together.
    ///
    /// The next call detects a change even if the derived values are the
    /// same as before the reset.
    pub fn reset_recomputations(&self) {
        let mut last_seen = self.last_seen.lock();
        self.selector.reset_recomputations();
        *last_seen = Version::INITIAL;
        tracing::debug!(responder = self.name, "recomputations reset");
    }

    /// Type-erase this responder for use with the connector.
    pub fn shared(self) -> Arc<dyn Respond<S, E>>
    where
        S: 'static,
    {
        Arc::new(self)
    }
}

impl<S, E, P> Respond<S, E> for Responder<S, E, P>
where
    P: Projections<S>,
    E: Send + 'static,
{
    fn call(&self, state: &S, dispatch: &Dispatcher<E>) -> Response {
        Responder::call(self, state, dispatch)
    }

    fn recomputations(&self) -> u64 {
        Responder::recomputations(self)
    }

    fn reset_recomputations(&self) {
        Responder::reset_recomputations(self);
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

impl<S, E, P> fmt::Debug for Responder<S, E, P>
where
    P: Projections<S>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("name", &self.name)
            .field("selector", &self.selector)
            .field("last_seen", &*self.last_seen.lock())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
