//! Run Events
//!
//! Progress notifications emitted while a reasoning run is in flight.
//! Every event carries a discriminant tag (see [`Event::name`]); consumers
//! match on the variant and ignore [`Event::Other`] tags they don't know.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// A keyed progress update (thought, tool input, final answer...)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub key: String,

    /// Already parsed value; display it, don't parse it again
    pub value: serde_json::Value,
}

impl Update {
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Tagged progress event
#[derive(Clone, Debug)]
pub enum Event {
    /// A new reasoning iteration (or nested invocation) begins
    Start { iteration: usize },

    Update { update: Update },

    /// A failed step is about to be attempted again
    Retry { attempt: usize, reason: String },

    Success { iteration: usize },

    Error { error: Arc<AgentError> },

    /// Tag this crate has no dedicated variant for
    Other { name: String, payload: serde_json::Value },
}

impl Event {
    pub fn update(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Event::Update {
            update: Update::new(key, value),
        }
    }

    pub fn error(error: AgentError) -> Self {
        Event::Error {
            error: Arc::new(error),
        }
    }

    /// Discriminant tag
    pub fn name(&self) -> &str {
        match self {
            Event::Start { .. } => "start",
            Event::Update { .. } => "update",
            Event::Retry { .. } => "retry",
            Event::Success { .. } => "success",
            Event::Error { .. } => "error",
            Event::Other { name, .. } => name,
        }
    }
}
