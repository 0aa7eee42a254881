//! Tool dispatcher - resolves and runs tool calls behind an error boundary

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use super::{ToolCallRequest, ToolCallResponse, ToolDescriptor, ToolError, ToolRegistry};

/// Anything that can list tools and run them for the conversation loop
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Descriptors to offer the model
    fn descriptors(&self) -> Vec<ToolDescriptor>;

    /// Run one tool call. Failures come back as error-flagged responses.
    async fn invoke(&self, request: ToolCallRequest) -> ToolCallResponse;

    /// Decode a model-supplied argument string, then invoke
    async fn invoke_encoded(&self, tool_name: &str, raw_arguments: &str) -> ToolCallResponse {
        match ToolCallRequest::decode(tool_name, raw_arguments) {
            Ok(request) => self.invoke(request).await,
            Err(err) => {
                log::warn!("Rejected arguments for {}: {}", tool_name, err);
                err.into()
            }
        }
    }
}

/// Runs tool calls against a registry
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// Share a registry with other dispatchers
    pub fn from_shared(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute a tool call, converting every fault into an error response
    pub async fn invoke(&self, request: ToolCallRequest) -> ToolCallResponse {
        log::debug!("Dispatching tool {} with {:?}", request.tool_name, request.arguments);

        let response = match self.try_invoke(&request).await {
            Ok(response) => response,
            Err(err) => ToolCallResponse::from(err),
        };

        if response.is_error {
            log::warn!("Tool {} failed: {}", request.tool_name, response.text_content());
        } else {
            log::debug!("Tool {} succeeded", request.tool_name);
        }
        response
    }

    async fn try_invoke(&self, request: &ToolCallRequest) -> Result<ToolCallResponse, ToolError> {
        let handler = self.registry.resolve(&request.tool_name)?;

        if let Some(descriptor) = self.registry.descriptor(&request.tool_name) {
            if let Some(missing) = descriptor
                .required_params()
                .find(|name| !request.arguments.contains_key(*name))
            {
                return Err(ToolError::execution(format!(
                    "missing required argument '{}' for tool '{}'",
                    missing, request.tool_name
                )));
            }
        }

        match AssertUnwindSafe(handler.call(&request.arguments))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => Err(ToolError::execution(format!(
                "tool '{}' panicked: {}",
                request.tool_name,
                panic_message(panic.as_ref())
            ))),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[async_trait]
impl ToolInvoker for Dispatcher {
    fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry.list().cloned().collect()
    }

    async fn invoke(&self, request: ToolCallRequest) -> ToolCallResponse {
        Dispatcher::invoke(self, request).await
    }
}
