//! # agent-core
//!
//! Core agent logic: a ReAct reasoning loop behind a provider-agnostic LLM
//! abstraction, typed run events, and bounded-retry execution.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Agent                               │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐   │
//! │  │  Reasoning  │  │    Tools    │  │   LlmProvider       │   │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │   │
//! │  └──────┬──────┘  └─────────────┘  └─────────────────────┘   │
//! │         │ Emitter                                             │
//! └─────────┼────────────────────────────────────────────────────┘
//!           ▼
//!   Run::observe ──► handler(&Event, &EventMeta)   (caller's task)
//! ```
//!
//! Anything implementing [`Reasoner`] can be driven through a [`Run`]; the
//! ReAct [`Agent`] is the stock implementation.

pub mod emitter;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod run;
pub mod tool;

pub use emitter::{Emitter, EmitterOptions, EventMeta};
pub use error::{AgentError, Result};
pub use event::{Event, Update};
pub use message::{Conversation, Message, Role};
pub use provider::LlmProvider;
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use run::{Prompt, Reasoner, Run, RunLimits, RunOutput};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
