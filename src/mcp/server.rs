//! In-process MCP-style server wrapping a tool registry

use serde::{Deserialize, Serialize};

use crate::tools::{Dispatcher, ToolCallRequest, ToolCallResponse, ToolDescriptor, ToolRegistry};

/// Server identity reported to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// A named, versioned set of tools
#[derive(Debug, Clone)]
pub struct McpServer {
    info: ServerInfo,
    dispatcher: Dispatcher,
}

impl McpServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>, registry: ToolRegistry) -> Self {
        Self {
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
            dispatcher: Dispatcher::new(registry),
        }
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Tools this server exposes, in registration order
    pub fn list_tools(&self) -> impl Iterator<Item = &ToolDescriptor> + Clone + '_ {
        self.dispatcher.registry().list()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.dispatcher.registry().contains(name)
    }

    /// Run a tool; unknown names and failures come back error-flagged
    pub async fn call_tool(&self, request: ToolCallRequest) -> ToolCallResponse {
        log::debug!("[{}] call_tool {}", self.info.name, request.tool_name);
        self.dispatcher.invoke(request).await
    }
}
