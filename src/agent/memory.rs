//! Thread-keyed conversation memory

use std::collections::HashMap;

use crate::error::Result;
use crate::llm::{ChatModel, Message};
use crate::tools::ToolInvoker;

use super::{AgentRunner, Conversation};

/// Conversations keyed by thread id
#[derive(Debug, Default)]
pub struct ThreadMemory {
    threads: HashMap<String, Conversation>,
}

impl ThreadMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversation for `thread_id`, created empty on first use
    pub fn thread(&mut self, thread_id: &str) -> &mut Conversation {
        self.threads.entry(thread_id.to_string()).or_default()
    }

    pub fn get(&self, thread_id: &str) -> Option<&Conversation> {
        self.threads.get(thread_id)
    }

    /// Forget one thread; returns whether it existed
    pub fn clear(&mut self, thread_id: &str) -> bool {
        self.threads.remove(thread_id).is_some()
    }

    pub fn clear_all(&mut self) {
        self.threads.clear();
    }

    /// Known thread ids, sorted
    pub fn thread_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.threads.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

/// An agent that keeps a separate conversation per thread id
pub struct ThreadedAgent<M: ?Sized, T: ?Sized> {
    runner: AgentRunner<M, T>,
    memory: ThreadMemory,
}

impl<M, T> ThreadedAgent<M, T>
where
    M: ChatModel + ?Sized,
    T: ToolInvoker + ?Sized,
{
    pub fn new(runner: AgentRunner<M, T>) -> Self {
        Self {
            runner,
            memory: ThreadMemory::new(),
        }
    }

    /// Continue the conversation of `thread_id`
    pub async fn chat(&mut self, thread_id: &str, text: impl Into<String>) -> Result<String> {
        log::debug!("Chat on thread {}", thread_id);
        let conversation = self.memory.thread(thread_id);
        self.runner.respond(conversation, text).await
    }

    /// Messages of `thread_id`; empty for unknown threads
    pub fn history(&self, thread_id: &str) -> &[Message] {
        self.memory.get(thread_id).map(Conversation::messages).unwrap_or(&[])
    }

    pub fn clear(&mut self, thread_id: &str) -> bool {
        self.memory.clear(thread_id)
    }

    pub fn memory(&self) -> &ThreadMemory {
        &self.memory
    }
}
