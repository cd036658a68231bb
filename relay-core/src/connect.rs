//! Connecting responders to a container.
//!
//! Each responder gets its own listener. On every notification the listener
//! reads the container's state, calls the responder, and spawns the
//! resulting [`Response`](crate::reactive::Response) on the connector's
//! runtime without waiting for it. The spawned task owns the in-flight
//! effect, so it keeps running after the listener returns and even after the
//! responder is unsubscribed.
//!
//! Reading the snapshot and calling the responder happen under one
//! per-listener lock. When several threads dispatch at once, the listener
//! that runs last therefore sees the latest state, and the responder never
//! acts on an older snapshot after a newer one. The lock is re-entrant, so a
//! producer may still dispatch synchronously to the same container.
//!
//! Listeners hold the container weakly: connecting responders never keeps a
//! container alive on its own.

use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tokio::runtime::Handle;

use crate::error::Result;
use crate::reactive::{Dispatcher, Respond};
use crate::store::{Listener, StateContainer, Unsubscribe};

/// Type-erased responder accepted by the connector.
pub type SharedResponder<C> =
    Arc<dyn Respond<<C as StateContainer>::State, <C as StateContainer>::Event>>;

/// Wires responders to containers and drives their effects on a runtime.
#[derive(Debug, Clone)]
pub struct Connector {
    handle: Handle,
}

impl Connector {
    /// Use the given runtime to drive effects.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running on.
    pub fn current() -> Result<Self> {
        Ok(Self::new(Handle::try_current()?))
    }

    /// Subscribe every responder to `container`.
    ///
    /// Returns one unsubscribe handle per responder, in input order.
    pub fn connect<C>(&self, responders: &[SharedResponder<C>], container: &Arc<C>) -> Vec<Unsubscribe>
    where
        C: StateContainer,
    {
        responders
            .iter()
            .map(|responder| self.connect_one(Arc::clone(responder), container))
            .collect()
    }

    fn connect_one<C>(&self, responder: SharedResponder<C>, container: &Arc<C>) -> Unsubscribe
    where
        C: StateContainer,
    {
        let name = responder.name();

        let weak = Arc::downgrade(container);
        let dispatch = Dispatcher::new({
            let weak = weak.clone();
            move |event| match weak.upgrade() {
                Some(container) => container.dispatch(event),
                None => tracing::warn!(responder = name, "container dropped, discarding event"),
            }
        });

        let handle = self.handle.clone();
        let observing = ReentrantMutex::new(());
        let listener: Listener = Arc::new(move || {
            let Some(container) = weak.upgrade() else {
                return;
            };
            // Snapshot and call under one lock, so the last caller always
            // observes the latest state
            let response = {
                let _observing = observing.lock();
                let state = container.state();
                responder.call(&state, &dispatch)
            };
            if !response.is_noop() {
                handle.spawn(response);
            }
        });

        let unsubscribe = container.subscribe(listener);
        tracing::debug!(responder = name, listener = ?unsubscribe.id(), "responder connected");
        unsubscribe
    }
}

/// Subscribe `responders` to `container`, driving effects on the current
/// tokio runtime.
///
/// Fails with [`Error::NoRuntime`](crate::Error::NoRuntime) outside a
/// runtime.
pub fn connect<C>(responders: &[SharedResponder<C>], container: &Arc<C>) -> Result<Vec<Unsubscribe>>
where
    C: StateContainer,
{
    Ok(Connector::current()?.connect(responders, container))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{Effect, Responder};
    use crate::store::Store;
    use crate::Error;
    use parking_lot::Mutex;
    use std::sync::Barrier;
    use std::time::Duration;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Event {
        Set(u32),
        Seen(u32),
    }

    #[derive(Debug, Default)]
    struct State {
        value: u32,
        seen: Vec<u32>,
    }

    fn reduce(state: &State, event: &Event) -> State {
        match *event {
            Event::Set(value) => State {
                value,
                seen: state.seen.clone(),
            },
            Event::Seen(value) => {
                let mut seen = state.seen.clone();
                seen.push(value);
                State {
                    value: state.value,
                    seen,
                }
            }
        }
    }

    fn echo() -> SharedResponder<Store<State, Event>> {
        Responder::new(
            (|s: &State| s.value,),
            |value: u32| Effect::<u32, ()>::ok(value),
            Event::Seen,
            |_: ()| Event::Seen(0),
        )
        .named("echo")
        .shared()
    }

    #[test]
    fn connect_outside_runtime_fails() {
        let store = Arc::new(Store::new(State::default(), reduce));
        let result = connect(&[echo()], &store);
        assert!(matches!(result, Err(Error::NoRuntime(_))));
        assert_eq!(store.listener_count(), 0);
    }

    #[tokio::test]
    async fn returns_one_handle_per_responder_in_order() {
        let store = Arc::new(Store::new(State::default(), reduce));
        let handles = connect(&[echo(), echo()], &store).unwrap();

        assert_eq!(handles.len(), 2);
        assert_eq!(store.listener_count(), 2);

        for handle in handles {
            handle.unsubscribe();
        }
        assert_eq!(store.listener_count(), 0);
    }

    #[tokio::test]
    async fn notifications_spawn_effects() {
        let store = Arc::new(Store::new(State::default(), reduce));
        let _handles = connect(&[echo()], &store).unwrap();

        store.dispatch(Event::Set(7));
        tokio::task::yield_now().await;

        assert_eq!(store.state().seen, vec![7]);
    }

    #[test]
    fn concurrent_dispatches_settle_on_latest_state() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let connector = Connector::new(runtime.handle().clone());

        for _ in 0..50 {
            let store = Arc::new(Store::new(State::default(), reduce));
            let last_produced = Arc::new(Mutex::new(None));

            let responder = {
                let last_produced = last_produced.clone();
                Responder::new(
                    (|s: &State| {
                        std::thread::sleep(Duration::from_micros(200));
                        s.value
                    },),
                    move |value: u32| {
                        *last_produced.lock() = Some(value);
                        Effect::<u32, ()>::none()
                    },
                    Event::Seen,
                    |_: ()| Event::Seen(0),
                )
                .shared()
            };
            let _handles = connector.connect(&[responder], &store);

            let barrier = Arc::new(Barrier::new(4));
            let threads: Vec<_> = (1..=4)
                .map(|value| {
                    let store = store.clone();
                    let barrier = barrier.clone();
                    std::thread::spawn(move || {
                        barrier.wait();
                        store.dispatch(Event::Set(value));
                    })
                })
                .collect();
            for thread in threads {
                thread.join().unwrap();
            }

            assert_eq!(*last_produced.lock(), Some(store.state().value));
        }
    }

    #[test]
    fn producer_may_dispatch_synchronously() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let connector = Connector::new(runtime.handle().clone());
        let store = Arc::new(Store::new(State::default(), reduce));

        let weak = Arc::downgrade(&store);
        let responder = Responder::new(
            (|s: &State| s.value,),
            move |value: u32| {
                if let Some(store) = weak.upgrade() {
                    store.dispatch(Event::Seen(value));
                }
                Effect::<u32, ()>::none()
            },
            Event::Seen,
            |_: ()| Event::Seen(0),
        )
        .shared();
        let _handles = connector.connect(&[responder], &store);

        store.dispatch(Event::Set(3));
        assert_eq!(store.state().seen, vec![3]);
    }

    #[tokio::test]
    async fn listener_does_not_keep_container_alive() {
        let store = Arc::new(Store::new(State::default(), reduce));
        let weak = Arc::downgrade(&store);
        let _handles = connect(&[echo()], &store).unwrap();

        drop(store);
        assert!(weak.upgrade().is_none());
    }
}
