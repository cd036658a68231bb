//! Error types.
//!
//! Effect failures are not errors: a rejected effect becomes a dispatched
//! failure event. The variants here cover wiring mistakes and building
//! events whose payload cannot be represented as JSON.

use thiserror::Error;

/// Errors raised while wiring responders to a container.
#[derive(Debug, Error)]
pub enum Error {
    /// `connect` was called outside a tokio runtime, so there is nowhere to
    /// spawn effect responses.
    #[error("no tokio runtime is available to drive responder effects")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// An [`Action`](crate::Action) payload failed to serialize.
    #[error("action payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
