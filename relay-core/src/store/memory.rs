//! In-memory Store
//!
//! A [`Store`] holds the full state behind an `Arc`, reduces events into new
//! state with a pure reducer, and notifies listeners after every dispatch.
//!
//! # How Dispatch Works
//!
//! 1. The reducer runs under the state write lock, so reductions are
//!    serialized and each one sees the result of the previous.
//!
//! 2. The new state is published before any listener runs.
//!
//! 3. Listeners are snapshotted in subscription order, then invoked with no
//!    lock held. A listener may read state and dispatch again; the nested
//!    dispatch notifies everyone before the outer notification continues.
//!
//! A listener removed during a notification still receives that
//! notification, since it was part of the snapshot.
//!
//! The reducer must not dispatch to the same store.

use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;

use super::container::{Listener, ListenerId, StateContainer, Unsubscribe};

type Registry = Mutex<IndexMap<ListenerId, Listener>>;
type Reducer<S, E> = dyn Fn(&S, &E) -> S + Send + Sync;

/// A state container driven by a reducer.
///
/// # Example
///
/// ```rust,ignore
/// let store = Store::new(0_i64, |count: &i64, delta: &i64| count + delta);
///
/// store.dispatch(5);
/// assert_eq!(*store.state(), 5);
/// ```
pub struct Store<S, E> {
    state: RwLock<Arc<S>>,

    reducer: Box<Reducer<S, E>>,

    /// Listeners in subscription order. Shared weakly with unsubscribe
    /// handles so a handle never keeps the store alive.
    listeners: Arc<Registry>,
}

impl<S, E> Store<S, E>
where
    S: Send + Sync + 'static,
    E: Send + 'static,
{
    /// Create a store with an initial state and a reducer.
    pub fn new<F>(initial: S, reducer: F) -> Self
    where
        F: Fn(&S, &E) -> S + Send + Sync + 'static,
    {
        Self {
            state: RwLock::new(Arc::new(initial)),
            reducer: Box::new(reducer),
            listeners: Arc::new(Mutex::new(IndexMap::new())),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.state.read())
    }

    /// Reduce `event` into a new state and notify listeners.
    pub fn dispatch(&self, event: E) {
        {
            let mut state = self.state.write();
            let next = (self.reducer)(&state, &event);
            *state = Arc::new(next);
        }

        self.notify_listeners();
    }

    /// Register a listener, returning the handle that removes it.
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe_listener(Arc::new(listener))
    }

    fn subscribe_listener(&self, listener: Listener) -> Unsubscribe {
        let id = ListenerId::new();
        self.listeners.lock().insert(id, listener);

        let registry: Weak<Registry> = Arc::downgrade(&self.listeners);
        Unsubscribe::new(id, move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().shift_remove(&id);
            }
        })
    }

    /// Notify all listeners that the state changed.
    fn notify_listeners(&self) {
        let snapshot: SmallVec<[Listener; 4]> = self.listeners.lock().values().cloned().collect();
        for listener in snapshot {
            listener();
        }
    }

    /// Get the number of listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl<S, E> StateContainer for Store<S, E>
where
    S: Send + Sync + 'static,
    E: Send + 'static,
{
    type State = S;
    type Event = E;

    fn state(&self) -> Arc<S> {
        Store::state(self)
    }

    fn dispatch(&self, event: E) {
        Store::dispatch(self, event);
    }

    fn subscribe(&self, listener: Listener) -> Unsubscribe {
        self.subscribe_listener(listener)
    }
}

impl<S, E> fmt::Debug for Store<S, E>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.state.read())
            .field("listener_count", &self.listeners.lock().len())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    fn counter() -> Arc<Store<i64, i64>> {
        Arc::new(Store::new(0, |count: &i64, delta: &i64| count + delta))
    }

    #[test]
    fn store_dispatch_reduces_state() {
        let store = counter();
        assert_eq!(*store.state(), 0);

        store.dispatch(42);
        assert_eq!(*store.state(), 42);

        store.dispatch(-2);
        assert_eq!(*store.state(), 40);
    }

    #[test]
    fn store_notifies_listeners() {
        let store = counter();
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let _handle = store.subscribe(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(call_count.load(Ordering::SeqCst), 0);

        store.dispatch(1);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);

        store.dispatch(2);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listeners_see_updated_state() {
        let store = counter();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let store_clone = Arc::downgrade(&store);
        let seen_clone = seen.clone();
        let _handle = store.subscribe(move || {
            if let Some(store) = store_clone.upgrade() {
                seen_clone.lock().push(*store.state());
            }
        });

        store.dispatch(3);
        store.dispatch(4);
        assert_eq!(*seen.lock(), vec![3, 7]);
    }

    #[test]
    fn store_unsubscribe() {
        let store = counter();
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let handle = store.subscribe(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.dispatch(1);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);

        handle.unsubscribe();
        assert_eq!(store.listener_count(), 0);

        store.dispatch(2);
        // Should not have been called again
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let store = counter();
        let order = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..3)
            .map(|i| {
                let order = order.clone();
                store.subscribe(move || order.lock().push(i))
            })
            .collect();

        store.dispatch(1);
        assert_eq!(*order.lock(), vec![0, 1, 2]);

        // Removing the middle listener keeps the others in order
        let mut handles = handles.into_iter();
        let _first = handles.next();
        handles.next().unwrap().unsubscribe();

        order.lock().clear();
        store.dispatch(1);
        assert_eq!(*order.lock(), vec![0, 2]);
    }

    #[test]
    fn listener_may_dispatch_again() {
        let store = counter();

        let weak = Arc::downgrade(&store);
        let _handle = store.subscribe(move || {
            if let Some(store) = weak.upgrade() {
                if *store.state() < 3 {
                    store.dispatch(1);
                }
            }
        });

        store.dispatch(1);
        assert_eq!(*store.state(), 3);
    }

    #[test]
    fn unsubscribe_after_store_dropped_is_harmless() {
        let store = counter();
        let handle = store.subscribe(|| {});
        drop(store);
        handle.unsubscribe();
    }
}
