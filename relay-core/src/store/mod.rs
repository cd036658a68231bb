//! State Containers
//!
//! Responders never own state. They read snapshots from a container and
//! propose changes by dispatching events to it. This module defines that
//! boundary ([`StateContainer`]) and ships a small in-memory implementation
//! ([`Store`]) suitable for applications and tests.
//!
//! # Contract
//!
//! - `state()` returns the latest full snapshot.
//! - `dispatch(event)` applies the event synchronously.
//! - `subscribe(listener)` registers a listener that runs after every
//!   dispatch, with the new state already visible, and returns an
//!   [`Unsubscribe`] handle that removes it for good.

mod container;
mod memory;

pub use container::{Listener, ListenerId, StateContainer, Unsubscribe};
pub use memory::Store;
