//! Tool system - descriptors, registry, and dispatch
//!
//! A tool is a named capability the model can ask us to run. The registry maps
//! each name to a descriptor (what the model sees) and a handler (what we run);
//! the dispatcher turns every lookup or execution fault into an error-flagged
//! response so one bad tool never aborts a conversation.

mod builtin;
mod descriptor;
mod dispatcher;
mod registry;
mod request;

pub use builtin::{calculator_registry, weather_registry};
pub use descriptor::{ParamType, ParameterSpec, ToolDescriptor};
pub use dispatcher::{Dispatcher, ToolInvoker};
pub use registry::{FnHandler, ToolRegistry, handler_fn};
pub use request::{Arguments, ContentSegment, ToolCallRequest, ToolCallResponse, int_arg, str_arg};

use async_trait::async_trait;

/// Executes one tool given already-decoded arguments
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool. Returning `Err` is reported to the model, never raised further.
    async fn call(&self, arguments: &Arguments) -> Result<ToolCallResponse, ToolError>;
}

/// Errors raised while registering, resolving, or running tools
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool already registered: {0}")]
    Duplicate(String),

    #[error("Tool execution failed: {0}")]
    Execution(String),

    #[error("Invalid tool arguments: {0}")]
    ArgumentDecode(String),
}

impl ToolError {
    /// Shorthand for a handler-side failure
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}
