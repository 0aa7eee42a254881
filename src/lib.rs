//! Agentlab - LLM function calling, MCP-style tools, agents, and RAG
//!
//! A tool registry and dispatcher, a bounded conversation loop that alternates
//! between a chat model and the dispatcher, in-process MCP servers, thread-keyed
//! conversation memory, prompt templates, and a small retrieval pipeline.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod prompt;
pub mod rag;
pub mod tools;

pub use error::{AgentlabError, Result};
