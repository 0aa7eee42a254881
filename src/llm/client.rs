//! Core LLM client traits and a scripted stand-in for tests and offline runs

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::types::{ChatRequest, ChatResponse};

/// A hosted chat model. Each call is independent; history travels in the request.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Single completion request
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Model identifier used when the request does not name one
    fn model(&self) -> &str;
}

/// Turns text into embedding vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed each input; the output has one vector per input, in order
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },
}

impl LlmError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::ApiError { status, .. } => *status >= 500,
            LlmError::Network(_) => true,
            LlmError::InvalidResponse(_) => false,
            LlmError::JsonError(_) => false,
            LlmError::MissingApiKey { .. } => false,
        }
    }
}

/// Replays canned responses in order and records every request it receives
#[derive(Debug)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<ChatResponse>>,
    repeat: Option<ChatResponse>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    /// Answer with `responses` one by one, then fail
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with the same response
    pub fn repeating(response: ChatResponse) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            repeat: Some(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of completions served
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        next.or_else(|| self.repeat.clone())
            .ok_or_else(|| LlmError::InvalidResponse("scripted model has no more responses".to_string()))
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}
