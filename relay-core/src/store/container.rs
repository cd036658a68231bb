//! The container interface responders are connected to.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A change notification callback. Listeners take no arguments: they read
/// whatever they need from the container.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Generate a new unique listener ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// A holder of state that accepts events and announces changes.
pub trait StateContainer: Send + Sync + 'static {
    /// The full state.
    type State: Send + Sync + 'static;

    /// Events accepted by `dispatch`.
    type Event: Send + 'static;

    /// Snapshot of the latest state.
    fn state(&self) -> Arc<Self::State>;

    /// Apply one event. Listeners run after the new state is visible.
    fn dispatch(&self, event: Self::Event);

    /// Register a listener for every future change.
    fn subscribe(&self, listener: Listener) -> Unsubscribe;
}

/// Handle that permanently removes one listener.
///
/// Dropping the handle without calling [`Unsubscribe::unsubscribe`] leaves
/// the listener registered.
#[must_use = "dropping an Unsubscribe keeps the listener registered forever"]
pub struct Unsubscribe {
    id: ListenerId,
    remove: Box<dyn FnOnce() + Send>,
}

impl Unsubscribe {
    /// Wrap the removal action for listener `id`.
    pub fn new<F>(id: ListenerId, remove: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            id,
            remove: Box::new(remove),
        }
    }

    /// The listener this handle removes.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Stop the listener from being notified again.
    pub fn unsubscribe(self) {
        tracing::debug!(listener = ?self.id, "unsubscribing listener");
        (self.remove)();
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}
