//! OpenAI-compatible API client implementation
//!
//! Implements [`ChatModel`] and [`Embedder`] against any service that speaks the
//! OpenAI chat-completions and embeddings wire format (OpenAI, DeepSeek,
//! SiliconFlow, local gateways).

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::LlmConfig;
use crate::llm::client::{ChatModel, Embedder, LlmError};
use crate::llm::types::{ChatRequest, ChatResponse, FinishReason, Message, Role, ToolCall, ToolChoice, Usage};

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default embedding model
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Configuration for the OpenAI-compatible client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    pub embedding_model: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout: Duration::from_secs(300),
            temperature: None,
        }
    }
}

impl OpenAiConfig {
    /// Create a new config with a specific model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

impl From<&LlmConfig> for OpenAiConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            temperature: config.temperature,
        }
    }
}

/// OpenAI-compatible API client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    config: OpenAiConfig,
    usage: Arc<Mutex<Usage>>,
}

impl OpenAiClient {
    /// Create a client reading the API key from `api_key_env`
    pub fn from_env(api_key_env: &str, config: OpenAiConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(api_key_env).map_err(|_| LlmError::MissingApiKey {
            env_var: api_key_env.to_string(),
        })?;

        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: impl Into<String>, config: OpenAiConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
            usage: Arc::new(Mutex::new(Usage::default())),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn message_to_json(message: &Message) -> Value {
        match message.role {
            Role::Assistant if !message.tool_calls.is_empty() => {
                let tool_calls: Vec<Value> = message
                    .tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": call.arguments
                            }
                        })
                    })
                    .collect();
                let content = if message.content.is_empty() {
                    Value::Null
                } else {
                    json!(message.content)
                };
                json!({
                    "role": "assistant",
                    "content": content,
                    "tool_calls": tool_calls
                })
            }
            Role::Tool => json!({
                "role": "tool",
                "tool_call_id": message.tool_call_id,
                "content": message.content
            }),
            role => json!({
                "role": role.as_str(),
                "content": message.content
            }),
        }
    }

    fn tool_choice_to_json(choice: &ToolChoice) -> Value {
        match choice {
            ToolChoice::Auto => json!("auto"),
            ToolChoice::None => json!("none"),
            ToolChoice::Required => json!("required"),
            ToolChoice::Function(name) => json!({
                "type": "function",
                "function": { "name": name }
            }),
        }
    }

    /// Build the request body for the chat-completions endpoint
    fn build_chat_body(&self, request: &ChatRequest) -> Value {
        let model = request.model.as_ref().unwrap_or(&self.config.model);
        let messages: Vec<Value> = request.messages.iter().map(Self::message_to_json).collect();

        let mut body = json!({
            "model": model,
            "messages": messages
        });

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request.tools.iter().map(|t| t.to_openai_tool()).collect();
            body["tools"] = json!(tools);
            body["tool_choice"] = Self::tool_choice_to_json(&request.tool_choice);
        }

        if let Some(temperature) = request.temperature.or(self.config.temperature) {
            body["temperature"] = json!(temperature);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        body
    }

    /// Parse the chat-completions response
    fn parse_chat_response(&self, body: Value) -> Result<ChatResponse, LlmError> {
        let choice = body["choices"]
            .get(0)
            .ok_or_else(|| LlmError::InvalidResponse("response has no choices".to_string()))?;
        let message = &choice["message"];

        let content = message["content"].as_str().map(str::to_string);

        let mut tool_calls = Vec::new();
        if let Some(calls) = message["tool_calls"].as_array() {
            for call in calls {
                let id = call["id"]
                    .as_str()
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| LlmError::InvalidResponse("tool call without an id".to_string()))?
                    .to_string();
                let function = &call["function"];
                let name = function["name"]
                    .as_str()
                    .ok_or_else(|| LlmError::InvalidResponse("tool call without a function name".to_string()))?
                    .to_string();
                // Some providers send the arguments as an object instead of a string
                let arguments = match &function["arguments"] {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                tool_calls.push(ToolCall::new(id, name, arguments));
            }
        }

        let finish_reason = choice["finish_reason"]
            .as_str()
            .map(FinishReason::parse)
            .unwrap_or_default();

        let usage = body
            .get("usage")
            .map(|u| {
                Usage::new(
                    u["prompt_tokens"].as_u64().unwrap_or(0),
                    u["completion_tokens"].as_u64().unwrap_or(0),
                )
            })
            .unwrap_or_default();

        self.usage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add(&usage);

        Ok(ChatResponse {
            content,
            tool_calls,
            finish_reason,
            usage,
        })
    }

    fn build_embedding_body(&self, inputs: &[String]) -> Value {
        json!({
            "model": self.config.embedding_model,
            "input": inputs
        })
    }

    fn parse_embedding_response(body: Value, expected: usize) -> Result<Vec<Vec<f32>>, LlmError> {
        let data = body["data"]
            .as_array()
            .ok_or_else(|| LlmError::InvalidResponse("embedding response has no data".to_string()))?;

        let mut indexed = Vec::with_capacity(data.len());
        for (position, item) in data.iter().enumerate() {
            let index = item["index"].as_u64().map(|i| i as usize).unwrap_or(position);
            let embedding = item["embedding"]
                .as_array()
                .ok_or_else(|| LlmError::InvalidResponse("embedding item has no vector".to_string()))?
                .iter()
                .map(|v| v.as_f64().map(|f| f as f32))
                .collect::<Option<Vec<f32>>>()
                .ok_or_else(|| LlmError::InvalidResponse("embedding vector is not numeric".to_string()))?;
            indexed.push((index, embedding));
        }
        indexed.sort_by_key(|(index, _)| *index);

        if indexed.len() != expected {
            return Err(LlmError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                expected,
                indexed.len()
            )));
        }

        Ok(indexed.into_iter().map(|(_, embedding)| embedding).collect())
    }

    /// Send a request to the API
    async fn send_request(&self, url: &str, body: &Value) -> Result<Value, LlmError> {
        log::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();

        // Handle rate limiting
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        // Handle other errors
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Get cumulative token usage
    pub fn total_usage(&self) -> Usage {
        *self.usage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_ready(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = self.build_chat_body(&request);
        let response = self.send_request(&self.endpoint("chat/completions"), &body).await?;
        self.parse_chat_response(response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let body = self.build_embedding_body(inputs);
        let response = self.send_request(&self.endpoint("embeddings"), &body).await?;
        Self::parse_embedding_response(response, inputs.len())
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}
