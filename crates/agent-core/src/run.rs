//! Runs
//!
//! A [`Reasoner`] answers one [`Prompt`] per invocation. [`Reasoner::run`]
//! wires a fresh event channel to the invocation and hands back a [`Run`],
//! which is observed to completion on the caller's task:
//!
//! ```rust,ignore
//! let output = agent
//!     .run(prompt, RunLimits::default())
//!     .observe(EmitterOptions::default(), |event, meta| {
//!         println!("{} {:?}", meta.path, event);
//!         Ok(())
//!     })
//!     .await?;
//! ```

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::emitter::{Emitter, EmitterOptions, EventEnvelope, EventMeta};
use crate::error::Result;
use crate::event::Event;
use crate::message::Message;

/// Non-empty user input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    /// Trimmed prompt, or `None` for blank input
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let text = text.as_ref().trim();
        (!text.is_empty()).then(|| Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Retry and iteration bounds for one run.
///
/// `total_max_retries >= max_retries_per_step` is expected but not checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunLimits {
    pub max_retries_per_step: usize,
    pub total_max_retries: usize,
    pub max_iterations: usize,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_retries_per_step: 3,
            total_max_retries: 10,
            max_iterations: 20,
        }
    }
}

/// Final output of a successful run
#[derive(Clone, Debug)]
pub struct RunOutput {
    /// The answer given to the user
    pub last_message: Message,

    pub iterations: usize,

    /// Retries spent across all steps
    pub retries: usize,
}

impl RunOutput {
    pub fn text(&self) -> &str {
        &self.last_message.content
    }
}

/// The reasoning collaborator: anything that can answer a prompt while
/// reporting progress through an [`Emitter`].
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Answer `prompt` within `limits`. Errors that exceed the limits must be
    /// returned, not swallowed.
    async fn invoke(&self, prompt: Prompt, limits: RunLimits, emitter: Emitter) -> Result<RunOutput>;

    /// Start an observable run
    fn run(&self, prompt: Prompt, limits: RunLimits) -> Run<'_>
    where
        Self: Sized,
    {
        Run::new(self, prompt, limits)
    }
}

/// An invocation in flight plus the receiving end of its events
pub struct Run<'a> {
    task: BoxFuture<'a, Result<RunOutput>>,
    events: mpsc::UnboundedReceiver<EventEnvelope>,
}

impl<'a> Run<'a> {
    pub fn new(reasoner: &'a dyn Reasoner, prompt: Prompt, limits: RunLimits) -> Self {
        let (emitter, events) = Emitter::root("agent");
        tracing::debug!(run_id = %emitter.run_id(), "Starting run");

        Self {
            task: reasoner.invoke(prompt, limits, emitter),
            events,
        }
    }

    /// Drive the invocation to completion, handing every accepted event to
    /// `handler` as it arrives.
    ///
    /// Events are delivered in emission order and all of them are delivered
    /// before the outcome is returned. A handler error aborts the run.
    pub async fn observe<F>(self, options: EmitterOptions, mut handler: F) -> Result<RunOutput>
    where
        F: FnMut(&Event, &EventMeta) -> Result<()>,
    {
        let Run { mut task, mut events } = self;

        let outcome = loop {
            tokio::select! {
                biased;
                Some(envelope) = events.recv() => {
                    deliver(&options, &mut handler, &envelope)?;
                }
                outcome = &mut task => break outcome,
            }
        };

        // Tear down: no sender survives the task, and nothing is accepted
        // after close. Whatever is still buffered belongs to this run.
        drop(task);
        events.close();
        while let Ok(envelope) = events.try_recv() {
            deliver(&options, &mut handler, &envelope)?;
        }

        outcome
    }

    /// Await the outcome, discarding all events
    pub async fn output(self) -> Result<RunOutput> {
        self.observe(EmitterOptions::default(), |_, _| Ok(())).await
    }
}

fn deliver<F>(options: &EmitterOptions, handler: &mut F, envelope: &EventEnvelope) -> Result<()>
where
    F: FnMut(&Event, &EventMeta) -> Result<()>,
{
    if options.accepts(&envelope.meta) {
        handler(&envelope.event, &envelope.meta)
    } else {
        Ok(())
    }
}
