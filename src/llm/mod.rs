//! LLM Client Layer - OpenAI-compatible chat and embedding APIs
//!
//! This module provides:
//! - Message types for chat-completion communication
//! - ChatModel and Embedder traits for API abstraction
//! - OpenAiClient implementation
//! - ScriptedModel for deterministic runs

pub mod client;
pub mod openai;
pub mod types;

pub use client::{ChatModel, Embedder, LlmError, ScriptedModel};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use types::{ChatRequest, ChatResponse, FinishReason, Message, Role, ToolCall, ToolChoice, Usage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        // Verify all public types are accessible
        let _role = Role::User;
        let _finish = FinishReason::ToolCalls;
        let _choice = ToolChoice::Auto;
    }
}
