//! Tool call requests and response envelopes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::ToolError;

/// Decoded tool arguments
pub type Arguments = Map<String, Value>;

/// A request to run one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Arguments,
}

impl ToolCallRequest {
    pub fn new(tool_name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Build a request from the JSON-encoded argument string a model emits.
    ///
    /// An empty (or whitespace) string means no arguments. Anything else must be
    /// a JSON object.
    pub fn decode(tool_name: impl Into<String>, raw_arguments: &str) -> Result<Self, ToolError> {
        let tool_name = tool_name.into();
        if raw_arguments.trim().is_empty() {
            return Ok(Self::new(tool_name, Arguments::new()));
        }

        let value: Value = serde_json::from_str(raw_arguments).map_err(|e| {
            ToolError::ArgumentDecode(format!("arguments for '{}' are not valid JSON: {}", tool_name, e))
        })?;

        match value {
            Value::Object(arguments) => Ok(Self::new(tool_name, arguments)),
            other => Err(ToolError::ArgumentDecode(format!(
                "arguments for '{}' must be a JSON object, got {}",
                tool_name,
                json_kind(&other)
            ))),
        }
    }

    /// Fetch a required string argument
    pub fn str_arg(&self, name: &str) -> Result<&str, ToolError> {
        str_arg(&self.arguments, name)
    }
}

/// Fetch a required string argument from a decoded map
pub fn str_arg<'a>(arguments: &'a Arguments, name: &str) -> Result<&'a str, ToolError> {
    match arguments.get(name) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ToolError::execution(format!(
            "argument '{}' must be a string, got {}",
            name,
            json_kind(other)
        ))),
        None => Err(ToolError::execution(format!("missing required argument '{}'", name))),
    }
}

/// Fetch a required integer argument from a decoded map
pub fn int_arg(arguments: &Arguments, name: &str) -> Result<i64, ToolError> {
    match arguments.get(name) {
        Some(value) => value.as_i64().ok_or_else(|| {
            ToolError::execution(format!(
                "argument '{}' must be an integer, got {}",
                name,
                json_kind(value)
            ))
        }),
        None => Err(ToolError::execution(format!("missing required argument '{}'", name))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One piece of tool output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSegment {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ContentSegment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Uniform result envelope for every tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallResponse {
    pub content: Vec<ContentSegment>,
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl ToolCallResponse {
    /// Successful response with a single text segment
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentSegment::text(text)],
            is_error: false,
        }
    }

    /// Successful response carrying pretty-printed JSON
    pub fn json(value: &Value) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::text(text)
    }

    /// Error-flagged response with a single text segment
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentSegment::text(message)],
            is_error: true,
        }
    }

    /// All text segments joined by newlines
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Content of the tool-role message shown to the model
    pub fn to_tool_message_content(&self) -> String {
        if self.is_error {
            json!({ "error": true, "message": self.text_content() }).to_string()
        } else {
            self.text_content()
        }
    }
}

impl From<ToolError> for ToolCallResponse {
    fn from(err: ToolError) -> Self {
        Self::error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_object() {
        let request = ToolCallRequest::decode("add", r#"{"a": 10, "b": 20}"#).unwrap();
        assert_eq!(request.tool_name, "add");
        assert_eq!(request.arguments["a"], 10);
        assert_eq!(request.arguments["b"], 20);
    }

    #[test]
    fn test_decode_empty_string() {
        let request = ToolCallRequest::decode("get_inbox_count", "  ").unwrap();
        assert!(request.arguments.is_empty());
    }

    #[test]
    fn test_decode_malformed_json() {
        let err = ToolCallRequest::decode("add", r#"{"a": 10,"#).unwrap_err();
        assert!(matches!(err, ToolError::ArgumentDecode(_)));
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_decode_non_object() {
        let err = ToolCallRequest::decode("add", "[1, 2]").unwrap_err();
        assert!(matches!(err, ToolError::ArgumentDecode(_)));
        assert!(err.to_string().contains("got array"));
    }

    #[test]
    fn test_str_arg() {
        let request = ToolCallRequest::decode("send_email", r#"{"to": "a@b.c", "n": 3}"#).unwrap();
        assert_eq!(request.str_arg("to").unwrap(), "a@b.c");
        assert!(request.str_arg("n").unwrap_err().to_string().contains("must be a string"));
        assert!(request.str_arg("subject").unwrap_err().to_string().contains("missing"));
    }

    #[test]
    fn test_int_arg() {
        let request = ToolCallRequest::decode("add", r#"{"a": 7, "b": "x"}"#).unwrap();
        assert_eq!(int_arg(&request.arguments, "a").unwrap(), 7);
        assert!(int_arg(&request.arguments, "b").is_err());
        assert!(int_arg(&request.arguments, "c").is_err());
    }

    #[test]
    fn test_response_text() {
        let response = ToolCallResponse::text("30");
        assert!(!response.is_error);
        assert_eq!(response.content, vec![ContentSegment::text("30")]);
        assert_eq!(response.content[0].kind, "text");
        assert_eq!(response.to_tool_message_content(), "30");
    }

    #[test]
    fn test_response_error_tool_message() {
        let response = ToolCallResponse::error("Unknown tool: send_fax");
        assert!(response.is_error);
        let content: Value = serde_json::from_str(&response.to_tool_message_content()).unwrap();
        assert_eq!(content["error"], true);
        assert_eq!(content["message"], "Unknown tool: send_fax");
    }

    #[test]
    fn test_text_content_joins_segments() {
        let response = ToolCallResponse {
            content: vec![ContentSegment::text("one"), ContentSegment::text("two")],
            is_error: false,
        };
        assert_eq!(response.text_content(), "one\ntwo");
    }

    #[test]
    fn test_response_serialization() {
        let json = serde_json::to_value(ToolCallResponse::error("boom")).unwrap();
        assert_eq!(json["isError"], true);
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "boom");
    }

    #[test]
    fn test_from_tool_error() {
        let response: ToolCallResponse = ToolError::NotFound("x".into()).into();
        assert!(response.is_error);
        assert_eq!(response.text_content(), "Tool not found: x");
    }
}
