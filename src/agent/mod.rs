//! Agents - conversation history, the tool-calling loop, and thread memory

mod conversation;
mod memory;
mod runner;

pub use conversation::Conversation;
pub use memory::{ThreadMemory, ThreadedAgent};
pub use runner::{APOLOGY, AbortReason, Agent, AgentConfig, AgentRunner, ConversationLoop, LoopState};
