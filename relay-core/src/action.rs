//! Named event records.
//!
//! [`Action`] is a ready-made event type shaped like a flux standard action:
//! a `type` string, an optional JSON `payload`, and an `error` flag set when
//! the payload describes a failure.
//!
//! ```rust,ignore
//! let add_todo = Action::creator("ADD_TODO", |todo: Todo| json!({ "todo": todo }));
//! let handle_error = Action::failure_creator("HANDLE_ERROR");
//! ```

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A named event with a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: String,

    /// Event data; omitted from JSON when null.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,

    /// True when the payload describes a failure.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl Action {
    /// An action with a payload.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            error: false,
        }
    }

    /// An action with no payload.
    pub fn bare(kind: impl Into<String>) -> Self {
        Self::new(kind, Value::Null)
    }

    /// A failure action; the payload is `{ "message": .. }`.
    pub fn failure(kind: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            kind: kind.into(),
            payload: serde_json::json!({ "message": reason.to_string() }),
            error: true,
        }
    }

    /// An action whose payload is `payload` serialized to JSON.
    pub fn with_payload<T: Serialize>(kind: impl Into<String>, payload: &T) -> Result<Self> {
        Ok(Self::new(kind, serde_json::to_value(payload)?))
    }

    /// Build an event constructor for `kind`.
    pub fn creator<T, F>(kind: &'static str, payload: F) -> impl Fn(T) -> Self + Send + Sync + 'static
    where
        T: 'static,
        F: Fn(T) -> Value + Send + Sync + 'static,
    {
        move |value| Self::new(kind, payload(value))
    }

    /// Build a failure event constructor for `kind`.
    pub fn failure_creator<R>(kind: &'static str) -> impl Fn(R) -> Self + Send + Sync + 'static
    where
        R: fmt::Display + 'static,
    {
        move |reason| Self::failure(kind, reason)
    }

    /// Check the event kind.
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Deserialize the payload.
    pub fn payload_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.payload)
    }
}
