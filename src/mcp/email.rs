//! Mock email server: send_email, check_email_status, get_inbox_count

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::tools::{ParameterSpec, ToolCallResponse, ToolDescriptor, ToolError, ToolRegistry, handler_fn, str_arg};

use super::McpServer;

pub const EMAIL_SERVER_NAME: &str = "email-server";
pub const EMAIL_SERVER_VERSION: &str = "1.0.0";

/// A message accepted by `send_email`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentEmail {
    pub email_id: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub sent_at: String,
}

/// Shared record of every email the server accepted
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    emails: Arc<Mutex<Vec<SentEmail>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, email: SentEmail) {
        self.emails.lock().unwrap_or_else(PoisonError::into_inner).push(email);
    }

    pub fn find(&self, email_id: &str) -> Option<SentEmail> {
        self.emails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|e| e.email_id == email_id)
            .cloned()
    }

    pub fn emails(&self) -> Vec<SentEmail> {
        self.emails.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.emails.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `email_` followed by the first 12 hex chars of sha256(to + subject)
pub fn email_id(to: &str, subject: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(to.as_bytes());
    hasher.update(subject.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("email_{}", &digest[..12])
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Email server with a fresh outbox
pub fn email_server() -> Result<McpServer, ToolError> {
    email_server_with_outbox(Outbox::new())
}

/// Email server recording into `outbox`
pub fn email_server_with_outbox(outbox: Outbox) -> Result<McpServer, ToolError> {
    let send_outbox = outbox.clone();
    let status_outbox = outbox;

    let registry = ToolRegistry::new()
        .with_tool(
            ToolDescriptor::new("send_email", "Send an email to the given recipient")
                .with_param(ParameterSpec::string("to", "Recipient email address").required())
                .with_param(ParameterSpec::string("subject", "Email subject").required())
                .with_param(ParameterSpec::string("body", "Email body").required()),
            handler_fn(move |args| {
                let to = str_arg(args, "to")?;
                let subject = str_arg(args, "subject")?;
                let body = str_arg(args, "body")?;

                let email = SentEmail {
                    email_id: email_id(to, subject),
                    to: to.to_string(),
                    subject: subject.to_string(),
                    body: body.to_string(),
                    sent_at: now(),
                };
                log::info!("Sending email {} to {}", email.email_id, email.to);

                let response = ToolCallResponse::json(&json!({
                    "status": "success",
                    "message": format!("Email sent to {}", email.to),
                    "email_id": email.email_id,
                    "timestamp": email.sent_at,
                }));
                send_outbox.push(email);
                Ok(response)
            }),
        )?
        .with_tool(
            ToolDescriptor::new("check_email_status", "Check the delivery status of a sent email")
                .with_param(ParameterSpec::string("email_id", "Email id returned by send_email").required()),
            handler_fn(move |args| {
                let id = str_arg(args, "email_id")?;
                let email = status_outbox
                    .find(id)
                    .ok_or_else(|| ToolError::execution(format!("unknown email id '{}'", id)))?;
                Ok(ToolCallResponse::json(&json!({
                    "email_id": email.email_id,
                    "status": "delivered",
                    "delivered_at": email.sent_at,
                })))
            }),
        )?
        .with_tool(
            ToolDescriptor::new("get_inbox_count", "Get the number of unread emails in the inbox"),
            handler_fn(|_| {
                Ok(ToolCallResponse::json(&json!({
                    "unread_count": 5,
                    "total_count": 23,
                })))
            }),
        )?;

    Ok(McpServer::new(EMAIL_SERVER_NAME, EMAIL_SERVER_VERSION, registry))
}
