//! Small demo tools used by the calculator and weather agents

use super::request::{int_arg, str_arg};
use super::{ParameterSpec, ToolCallResponse, ToolDescriptor, ToolError, ToolRegistry, handler_fn};

/// Registry with `add` and `multiply` over integers
pub fn calculator_registry() -> Result<ToolRegistry, ToolError> {
    ToolRegistry::new()
        .with_tool(
            ToolDescriptor::new("add", "Add two numbers together. Returns the sum of a and b.")
                .with_param(ParameterSpec::integer("a", "First number").required())
                .with_param(ParameterSpec::integer("b", "Second number").required()),
            handler_fn(|args| {
                let (a, b) = (int_arg(args, "a")?, int_arg(args, "b")?);
                let sum = a
                    .checked_add(b)
                    .ok_or_else(|| ToolError::execution("integer overflow"))?;
                Ok(ToolCallResponse::text(sum.to_string()))
            }),
        )?
        .with_tool(
            ToolDescriptor::new(
                "multiply",
                "Multiply two numbers together. Returns the product of a and b.",
            )
            .with_param(ParameterSpec::integer("a", "First number").required())
            .with_param(ParameterSpec::integer("b", "Second number").required()),
            handler_fn(|args| {
                let (a, b) = (int_arg(args, "a")?, int_arg(args, "b")?);
                let product = a
                    .checked_mul(b)
                    .ok_or_else(|| ToolError::execution("integer overflow"))?;
                Ok(ToolCallResponse::text(product.to_string()))
            }),
        )
}

/// Registry with `get_current_weather(city, country)`
pub fn weather_registry() -> Result<ToolRegistry, ToolError> {
    ToolRegistry::new().with_tool(
        ToolDescriptor::new("get_current_weather", "Get the current weather for a city")
            .with_param(ParameterSpec::string("city", "The city to get the weather for").required())
            .with_param(
                ParameterSpec::string("country", "The country to get the weather for").required(),
            ),
        handler_fn(|args| {
            let city = str_arg(args, "city")?;
            let country = str_arg(args, "country")?;
            Ok(ToolCallResponse::text(format!(
                "The weather in {}, {} is sunny.",
                city, country
            )))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Dispatcher, ToolInvoker};

    #[tokio::test]
    async fn test_add() {
        let dispatcher = Dispatcher::new(calculator_registry().unwrap());
        let response = dispatcher.invoke_encoded("add", r#"{"a": 10, "b": 20}"#).await;
        assert_eq!(response, ToolCallResponse::text("30"));
    }

    #[tokio::test]
    async fn test_multiply() {
        let dispatcher = Dispatcher::new(calculator_registry().unwrap());
        let response = dispatcher.invoke_encoded("multiply", r#"{"a": 10, "b": 20}"#).await;
        assert_eq!(response, ToolCallResponse::text("200"));
    }

    #[tokio::test]
    async fn test_add_overflow() {
        let dispatcher = Dispatcher::new(calculator_registry().unwrap());
        let raw = format!(r#"{{"a": {}, "b": 1}}"#, i64::MAX);
        let response = dispatcher.invoke_encoded("add", &raw).await;
        assert!(response.is_error);
        assert!(response.text_content().contains("overflow"));
    }

    #[tokio::test]
    async fn test_add_wrong_type() {
        let dispatcher = Dispatcher::new(calculator_registry().unwrap());
        let response = dispatcher.invoke_encoded("add", r#"{"a": "ten", "b": 20}"#).await;
        assert!(response.is_error);
        assert!(response.text_content().contains("must be an integer"));
    }

    #[tokio::test]
    async fn test_weather_reads_city() {
        let dispatcher = Dispatcher::new(weather_registry().unwrap());
        let response = dispatcher
            .invoke_encoded("get_current_weather", r#"{"city": "Beijing", "country": "China"}"#)
            .await;
        assert_eq!(response.text_content(), "The weather in Beijing, China is sunny.");
    }

    #[test]
    fn test_weather_descriptor() {
        let registry = weather_registry().unwrap();
        let descriptor = registry.descriptor("get_current_weather").unwrap();
        let required: Vec<&str> = descriptor.required_params().collect();
        assert_eq!(required, vec!["city", "country"]);
    }
}
