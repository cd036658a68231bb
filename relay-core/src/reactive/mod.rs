//! Reactive Primitives
//!
//! This module implements responders: memoizing observers that turn a change
//! in derived state into exactly one asynchronous effect, and the effect's
//! outcome into exactly one event.
//!
//! # Concepts
//!
//! ## Projections
//!
//! A projection is a pure function from the full state to one derived value.
//! A responder holds an ordered tuple of them; the order fixes the argument
//! order of its producer.
//!
//! ## Selectors
//!
//! A Selector runs the projections and caches the resulting tuple. It bumps
//! a version stamp only when some position is not [`Identity::same`] as
//! before. Identity is strict: primitives by value, `Arc`s by pointer.
//!
//! ## Effects
//!
//! A producer answers each detected change with an [`Effect`]: either
//! `NoEffect`, or a pending future whose success and failure are mapped to
//! events by the responder's event constructors.
//!
//! ## Responders
//!
//! A [`Responder`] ties the three together and remembers the last version it
//! acted on. Calling it with unchanged state is a cheap no-op.
//!
//! # Implementation Notes
//!
//! Change detection compares version stamps, never values. Values are
//! compared once, inside the selector, when the stamp is decided.

mod effect;
mod identity;
mod projection;
mod responder;
mod selector;

pub use effect::{Effect, Response};
pub use identity::Identity;
pub use projection::{Produce, Projections};
pub use responder::{Dispatcher, Respond, Responder};
pub use selector::{Evaluation, Selector, Version};
