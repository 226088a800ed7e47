//! Event Emitter
//!
//! One emitter tree exists per run. The root emitter and every child share
//! a single unbounded channel, so events reach the subscriber in exactly the
//! order they were emitted. Children mark their events as nested
//! (`depth > 0`); subscribers decide through [`EmitterOptions`] whether to
//! see them.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::event::Event;

/// Where and when an event was emitted
#[derive(Clone, Debug)]
pub struct EventMeta {
    /// Event tag, same as [`Event::name`]
    pub name: String,

    /// Dotted emitter path, e.g. `agent` or `agent.tool.weather`
    pub path: String,

    /// 0 for the run itself, >0 for nested invocations
    pub depth: usize,

    pub run_id: Uuid,

    pub created_at: DateTime<Utc>,
}

impl EventMeta {
    pub fn is_nested(&self) -> bool {
        self.depth > 0
    }
}

/// An event together with its metadata, as sent over the channel
#[derive(Clone, Debug)]
pub struct EventEnvelope {
    pub event: Event,
    pub meta: EventMeta,
}

/// Subscription filter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitterOptions {
    /// Deliver events from nested invocations too
    pub match_nested: bool,
}

impl EmitterOptions {
    pub fn nested(match_nested: bool) -> Self {
        Self { match_nested }
    }

    pub fn accepts(&self, meta: &EventMeta) -> bool {
        self.match_nested || !meta.is_nested()
    }
}

/// Sending half of a run's event channel
#[derive(Clone, Debug)]
pub struct Emitter {
    tx: mpsc::UnboundedSender<EventEnvelope>,
    path: String,
    depth: usize,
    run_id: Uuid,
}

impl Emitter {
    /// Create the root emitter of a new run and the matching receiver
    pub fn root(
        name: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<EventEnvelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let emitter = Self {
            tx,
            path: name.into(),
            depth: 0,
            run_id: Uuid::new_v4(),
        };
        (emitter, rx)
    }

    /// Emitter for a nested invocation below this one
    pub fn child(&self, name: &str) -> Self {
        Self {
            tx: self.tx.clone(),
            path: format!("{}.{}", self.path, name),
            depth: self.depth + 1,
            run_id: self.run_id,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Emit an event. Once the subscription is torn down the event is
    /// discarded.
    pub fn emit(&self, event: Event) {
        let meta = EventMeta {
            name: event.name().to_string(),
            path: self.path.clone(),
            depth: self.depth,
            run_id: self.run_id,
            created_at: Utc::now(),
        };

        if self.tx.send(EventEnvelope { event, meta }).is_err() {
            tracing::trace!(path = %self.path, "Subscriber gone, event dropped");
        }
    }
}
