//! Append-only conversation history

use std::collections::HashSet;

use crate::error::{AgentlabError, Result};
use crate::llm::{Message, Role};

/// Ordered message history owned by one session
///
/// Every tool-role message must answer a tool call id that an earlier
/// assistant message requested; `append` refuses anything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
    pending_call_ids: HashSet<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a conversation from stored messages, validating each one
    pub fn from_messages(messages: impl IntoIterator<Item = Message>) -> Result<Self> {
        let mut conversation = Self::new();
        for message in messages {
            conversation.append(message)?;
        }
        Ok(conversation)
    }

    /// Add a message at the end of the history
    pub fn append(&mut self, message: Message) -> Result<()> {
        match message.role {
            Role::Tool => {
                let id = message.tool_call_id.as_deref().ok_or_else(|| {
                    AgentlabError::InvalidHistory("tool message has no tool_call_id".to_string())
                })?;
                if !self.pending_call_ids.contains(id) {
                    return Err(AgentlabError::InvalidHistory(format!(
                        "tool message answers unknown tool call '{}'",
                        id
                    )));
                }
            }
            Role::Assistant => {
                self.pending_call_ids
                    .extend(message.tool_calls.iter().map(|call| call.id.clone()));
            }
            Role::System | Role::User => {}
        }

        self.messages.push(message);
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop all history
    pub fn reset(&mut self) {
        self.messages.clear();
        self.pending_call_ids.clear();
    }
}
