//! MCP-style tool servers and the client that aggregates them
//!
//! Servers live in-process; there is no JSON-RPC transport. The client
//! implements [`ToolInvoker`](crate::tools::ToolInvoker) so an agent can use
//! every connected server's tools as one set.

mod client;
mod email;
mod server;

pub use client::{McpClient, ServerTool};
pub use email::{
    EMAIL_SERVER_NAME, EMAIL_SERVER_VERSION, Outbox, SentEmail, email_id, email_server, email_server_with_outbox,
};
pub use server::{McpServer, ServerInfo};
