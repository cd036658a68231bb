//! Relay Core
//!
//! This crate lets an application react to changes in part of its state by
//! running an asynchronous side effect once per change, and feeds the
//! effect's outcome back into state as an event. It implements:
//!
//! - Memoizing selectors over tuples of projections
//! - Responders that run one effect per detected change
//! - A connector that subscribes responders to a state container
//! - A reference in-memory store and a flux-style `Action` event type
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: selectors, effects, and responders
//! - `store`: the state container interface and an in-memory `Store`
//! - `connect`: wiring responders to containers on a tokio runtime
//! - `action`: a ready-made named event record
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_core::reactive::{Effect, Responder};
//! use relay_core::store::Store;
//!
//! let store = Arc::new(Store::new(State::default(), reduce));
//!
//! let fetch_user = Responder::new(
//!     (|s: &State| s.user_id,),
//!     |id: Option<u64>| match id {
//!         Some(id) => Effect::pending(api::fetch_user(id)),
//!         None => Effect::none(),
//!     },
//!     Event::UserLoaded,
//!     Event::UserFailed,
//! )
//! .shared();
//!
//! let _unsubscribe = relay_core::connect(&[fetch_user], &store)?;
//!
//! // Selecting a user now fetches it once and dispatches the result
//! store.dispatch(Event::SelectUser(7));
//! ```

pub mod action;
pub mod connect;
pub mod reactive;
pub mod store;

mod error;

pub use action::Action;
pub use connect::{connect, Connector};
pub use error::{Error, Result};
