//! MCP client - aggregates tools from connected servers

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::tools::{Arguments, ToolCallRequest, ToolCallResponse, ToolDescriptor, ToolError, ToolInvoker};

use super::McpServer;

/// A tool together with the server that exposes it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerTool {
    pub server: String,
    #[serde(flatten)]
    pub descriptor: ToolDescriptor,
}

/// Client holding connections to in-process servers, in connection order
#[derive(Debug, Default, Clone)]
pub struct McpClient {
    servers: Vec<(String, Arc<McpServer>)>,
}

impl McpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `server` under `name`. Re-connecting a name replaces the old server in place.
    pub fn connect_server(&mut self, name: impl Into<String>, server: impl Into<Arc<McpServer>>) {
        let name = name.into();
        let server = server.into();
        log::info!(
            "Connecting to server {} ({} {})",
            name,
            server.info().name,
            server.info().version
        );

        match self.servers.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = server,
            None => self.servers.push((name, server)),
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.servers.is_empty()
    }

    pub fn server_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.servers.iter().map(|(name, _)| name.as_str())
    }

    /// Every tool of every server, grouped by server in connection order
    pub fn list_all_tools(&self) -> Vec<ServerTool> {
        self.servers
            .iter()
            .flat_map(|(name, server)| {
                server.list_tools().map(move |descriptor| ServerTool {
                    server: name.clone(),
                    descriptor: descriptor.clone(),
                })
            })
            .collect()
    }

    /// Call `tool_name` on the first server that exposes it
    pub async fn call_tool(&self, tool_name: &str, arguments: Arguments) -> ToolCallResponse {
        let Some((server_name, server)) = self.servers.iter().find(|(_, s)| s.has_tool(tool_name)) else {
            log::warn!("No connected server exposes tool {}", tool_name);
            return ToolError::NotFound(tool_name.to_string()).into();
        };

        log::debug!("Routing {} to {}", tool_name, server_name);
        server.call_tool(ToolCallRequest::new(tool_name, arguments)).await
    }

    /// Tools the model may call: first server wins on a shared name, as in `call_tool`
    pub fn routable_tools(&self) -> Vec<ToolDescriptor> {
        let mut seen = HashSet::new();
        self.list_all_tools()
            .into_iter()
            .filter(|tool| seen.insert(tool.descriptor.name.clone()))
            .map(|tool| tool.descriptor)
            .collect()
    }

    /// Routable tools in the OpenAI function-calling format
    pub fn tools_for_openai(&self) -> Vec<Value> {
        self.routable_tools().iter().map(ToolDescriptor::to_openai_tool).collect()
    }
}

#[async_trait]
impl ToolInvoker for McpClient {
    fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.routable_tools()
    }

    async fn invoke(&self, request: ToolCallRequest) -> ToolCallResponse {
        self.call_tool(&request.tool_name, request.arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::email_server;
    use crate::tools::{calculator_registry, weather_registry};

    fn client() -> McpClient {
        let mut client = McpClient::new();
        client.connect_server("calc", McpServer::new("calc", "1.0", calculator_registry().unwrap()));
        client.connect_server("email", email_server().unwrap());
        client
    }

    #[test]
    fn test_list_all_tools_tagged_by_server() {
        let tools = client().list_all_tools();
        let pairs: Vec<(&str, &str)> = tools
            .iter()
            .map(|t| (t.server.as_str(), t.descriptor.name.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("calc", "add"),
                ("calc", "multiply"),
                ("email", "send_email"),
                ("email", "check_email_status"),
                ("email", "get_inbox_count"),
            ]
        );
    }

    #[test]
    fn test_reconnect_replaces_in_place() {
        let mut client = client();
        client.connect_server("calc", McpServer::new("weather", "1.0", weather_registry().unwrap()));
        let names: Vec<&str> = client.server_names().collect();
        assert_eq!(names, vec!["calc", "email"]);
        assert_eq!(client.list_all_tools()[0].descriptor.name, "get_current_weather");
    }

    #[tokio::test]
    async fn test_call_tool_routes_to_server() {
        let response = client()
            .call_tool("add", serde_json::json!({"a": 2, "b": 3}).as_object().cloned().unwrap())
            .await;
        assert_eq!(response.text_content(), "5");
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let response = client().call_tool("send_fax", Arguments::new()).await;
        assert!(response.is_error);
        assert!(response.text_content().contains("send_fax"));
    }

    #[test]
    fn test_routable_tools_skip_shadowed_names() {
        let mut client = client();
        client.connect_server("calc2", McpServer::new("calc2", "1.0", calculator_registry().unwrap()));
        assert_eq!(client.list_all_tools().len(), 7);

        let names: Vec<String> = client.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec!["add", "multiply", "send_email", "check_email_status", "get_inbox_count"]
        );
        assert_eq!(client.tools_for_openai().len(), 5);
    }

    #[test]
    fn test_tools_for_openai() {
        let tools = client().tools_for_openai();
        assert_eq!(tools.len(), 5);
        assert_eq!(tools[2]["type"], "function");
        assert_eq!(tools[2]["function"]["name"], "send_email");
        assert_eq!(
            tools[2]["function"]["parameters"]["required"],
            serde_json::json!(["to", "subject", "body"])
        );
    }

    #[test]
    fn test_server_tool_serialization() {
        let tool = &client().list_all_tools()[0];
        let value = serde_json::to_value(tool).unwrap();
        assert_eq!(value["server"], "calc");
        assert_eq!(value["name"], "add");
    }

    #[test]
    fn test_empty_client() {
        let client = McpClient::new();
        assert!(!client.is_connected());
        assert!(client.descriptors().is_empty());
    }
}
