//! Error types for agentlab
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::llm::LlmError;
use crate::tools::ToolError;

/// All error types that can occur in agentlab
#[derive(Debug, Error)]
pub enum AgentlabError {
    /// Tool registration or dispatch error that escaped the dispatcher boundary
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Chat or embedding API error, surfaced as-is
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Conversation history would break the tool-call ordering rules
    #[error("Invalid history: {0}")]
    InvalidHistory(String),

    /// Prompt template could not be parsed or rendered
    #[error("Template error: {0}")]
    Template(String),

    /// Vector store error
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for agentlab operations
pub type Result<T> = std::result::Result<T, AgentlabError>;
