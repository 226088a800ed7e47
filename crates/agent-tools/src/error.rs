//! Error Types for the agent tools

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolsError>;

#[derive(Error, Debug)]
pub enum ToolsError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Weather service error: {0}")]
    Weather(String),

    #[error("Code interpreter error: {0}")]
    Interpreter(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ToolsError> for AgentError {
    fn from(err: ToolsError) -> Self {
        AgentError::ToolExecution(err.to_string())
    }
}
