//! Conversation loop - alternates model calls and tool dispatch until the
//! model answers in plain text or the iteration bound is hit.
//!
//! The loop is an explicit state machine. `step()` advances one transition,
//! `run()` steps until a terminal state.

use std::sync::Arc;

use crate::config::AgentSettings;
use crate::error::Result;
use crate::llm::{ChatModel, ChatRequest, Message, ToolCall};
use crate::tools::ToolInvoker;

use super::Conversation;

/// Returned when the iteration bound is hit before the model finishes
pub const APOLOGY: &str = "Sorry, the maximum number of iterations was reached and the task could not be completed.";

/// Configuration for the AgentRunner.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum model calls per user turn
    pub max_iterations: u32,
    /// Prepended once to an empty conversation
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            system_prompt: None,
            temperature: None,
        }
    }
}

impl AgentConfig {
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl From<&AgentSettings> for AgentConfig {
    fn from(settings: &AgentSettings) -> Self {
        Self {
            max_iterations: settings.max_iterations,
            system_prompt: settings.system_prompt.clone(),
            temperature: None,
        }
    }
}

/// Why a loop stopped without an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    MaxIterationsExceeded { limit: u32 },
}

/// State of a conversation loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// Next step calls the model
    AwaitingModel,
    /// Next step runs these calls, in order
    DispatchingTools(Vec<ToolCall>),
    /// Model answered in plain text
    Done(String),
    Aborted(AbortReason),
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Done(_) | LoopState::Aborted(_))
    }
}

/// One user turn in flight over a borrowed conversation
pub struct ConversationLoop<'a, M: ?Sized, T: ?Sized> {
    model: &'a M,
    tools: &'a T,
    config: &'a AgentConfig,
    conversation: &'a mut Conversation,
    state: LoopState,
    iteration: u32,
}

impl<'a, M, T> ConversationLoop<'a, M, T>
where
    M: ChatModel + ?Sized,
    T: ToolInvoker + ?Sized,
{
    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Model calls made so far
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn conversation(&self) -> &Conversation {
        &*self.conversation
    }

    /// Advance exactly one transition. Terminal states are left unchanged.
    ///
    /// Model API errors are returned as-is and leave the loop in `AwaitingModel`
    /// without using up an iteration, so the step can be retried.
    pub async fn step(&mut self) -> Result<&LoopState> {
        let next = match std::mem::replace(&mut self.state, LoopState::AwaitingModel) {
            LoopState::AwaitingModel => self.call_model().await?,
            LoopState::DispatchingTools(calls) => self.dispatch(calls).await?,
            terminal => terminal,
        };
        self.state = next;
        Ok(&self.state)
    }

    /// Step until `Done` or `Aborted` and return the text for the user
    pub async fn run(&mut self) -> Result<String> {
        loop {
            match self.step().await? {
                LoopState::Done(text) => return Ok(text.clone()),
                LoopState::Aborted(_) => return Ok(APOLOGY.to_string()),
                _ => continue,
            }
        }
    }

    async fn call_model(&mut self) -> Result<LoopState> {
        if self.iteration >= self.config.max_iterations {
            log::warn!(
                "Aborting after {} model calls without a final answer",
                self.iteration
            );
            self.conversation.append(Message::assistant(APOLOGY))?;
            return Ok(LoopState::Aborted(AbortReason::MaxIterationsExceeded {
                limit: self.config.max_iterations,
            }));
        }

        log::info!(
            "Iteration {}/{}: calling model",
            self.iteration + 1,
            self.config.max_iterations
        );

        let mut request =
            ChatRequest::new(self.conversation.messages().to_vec()).with_tools(self.tools.descriptors());
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        // Only completed calls count toward the bound
        let response = self.model.complete(request).await?;
        self.iteration += 1;
        let content = response.content.unwrap_or_default();

        if response.tool_calls.is_empty() {
            log::info!("Model answered after {} iteration(s)", self.iteration);
            self.conversation.append(Message::assistant(content.clone()))?;
            return Ok(LoopState::Done(content));
        }

        log::info!("Model requested {} tool call(s)", response.tool_calls.len());
        self.conversation
            .append(Message::assistant_with_tool_calls(content, response.tool_calls.clone()))?;
        Ok(LoopState::DispatchingTools(response.tool_calls))
    }

    async fn dispatch(&mut self, calls: Vec<ToolCall>) -> Result<LoopState> {
        for call in calls {
            log::debug!("Calling tool {} ({})", call.name, call.id);
            let response = self.tools.invoke_encoded(&call.name, &call.arguments).await;
            self.conversation
                .append(Message::tool(call.id, response.to_tool_message_content()))?;
        }
        Ok(LoopState::AwaitingModel)
    }
}

/// Drives conversation loops against a model and a tool source.
pub struct AgentRunner<M: ?Sized, T: ?Sized> {
    /// Chat model for completions
    model: Arc<M>,
    /// Tools offered to the model
    tools: Arc<T>,
    /// Configuration
    config: AgentConfig,
}

impl<M, T> AgentRunner<M, T>
where
    M: ChatModel + ?Sized,
    T: ToolInvoker + ?Sized,
{
    /// Create a new AgentRunner with the default configuration.
    pub fn new(model: Arc<M>, tools: Arc<T>) -> Self {
        Self::with_config(model, tools, AgentConfig::default())
    }

    /// Create a new AgentRunner with custom configuration.
    pub fn with_config(model: Arc<M>, tools: Arc<T>, config: AgentConfig) -> Self {
        Self { model, tools, config }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Record the user's message and return a loop positioned at `AwaitingModel`
    pub fn start<'a>(
        &'a self,
        conversation: &'a mut Conversation,
        text: impl Into<String>,
    ) -> Result<ConversationLoop<'a, M, T>> {
        if conversation.is_empty() {
            if let Some(system_prompt) = &self.config.system_prompt {
                conversation.append(Message::system(system_prompt.clone()))?;
            }
        }
        conversation.append(Message::user(text))?;

        Ok(ConversationLoop {
            model: &*self.model,
            tools: &*self.tools,
            config: &self.config,
            conversation,
            state: LoopState::AwaitingModel,
            iteration: 0,
        })
    }

    /// Run one full user turn and return the reply
    pub async fn respond(&self, conversation: &mut Conversation, text: impl Into<String>) -> Result<String> {
        self.start(conversation, text)?.run().await
    }
}

/// An agent that owns a single conversation
pub struct Agent<M: ?Sized, T: ?Sized> {
    runner: AgentRunner<M, T>,
    conversation: Conversation,
}

impl<M, T> Agent<M, T>
where
    M: ChatModel + ?Sized,
    T: ToolInvoker + ?Sized,
{
    pub fn new(runner: AgentRunner<M, T>) -> Self {
        Self {
            runner,
            conversation: Conversation::new(),
        }
    }

    pub async fn chat(&mut self, text: impl Into<String>) -> Result<String> {
        self.runner.respond(&mut self.conversation, text).await
    }

    /// Forget the conversation so far
    pub fn reset(&mut self) {
        self.conversation.reset();
    }

    pub fn history(&self) -> &[Message] {
        self.conversation.messages()
    }
}
