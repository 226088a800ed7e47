//! Error Types

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Maximum iterations reached in reasoning loop
    #[error("Maximum iterations ({0}) reached")]
    MaxIterations(usize),

    /// A step hit a fault that retrying cannot fix
    #[error("Step {step} failed")]
    StepFailed {
        step: usize,
        #[source]
        source: Arc<AgentError>,
    },

    /// A single step failed more often than allowed
    #[error("Step {step} failed after {limit} retries")]
    StepRetriesExceeded {
        step: usize,
        limit: usize,
        #[source]
        source: Arc<AgentError>,
    },

    /// The whole run used up its retry budget
    #[error("Total retry budget of {limit} exhausted")]
    TotalRetriesExceeded {
        limit: usize,
        #[source]
        source: Arc<AgentError>,
    },

    /// Parse error (e.g., empty or malformed model output)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Generic IO error (console, sockets)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if a failed step may be attempted again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::Provider(_)
                | AgentError::ProviderUnavailable(_)
                | AgentError::RateLimited(_)
                | AgentError::Parse(_)
                | AgentError::Io(_)
        )
    }

    /// Human-readable explanation: this error followed by its causes.
    ///
    /// Causes whose text is already part of the previous line are skipped,
    /// so `#[from]` wrappers don't repeat themselves.
    pub fn explain(&self) -> String {
        let mut lines = vec![self.to_string()];
        let mut source = self.source();

        while let Some(cause) = source {
            let text = cause.to_string();
            let repeated = lines.last().is_some_and(|prev| prev.contains(&text));
            if !repeated {
                lines.push(format!("  caused by: {}", text));
            }
            source = cause.source();
        }

        lines.join("\n")
    }
}
