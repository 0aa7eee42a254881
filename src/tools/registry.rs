//! Tool registry - maps tool names to descriptors and handlers

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::{Arguments, ToolCallResponse, ToolDescriptor, ToolError, ToolHandler};

/// Adapts a plain function or closure into a [`ToolHandler`]
pub struct FnHandler<F> {
    func: F,
}

#[async_trait]
impl<F> ToolHandler for FnHandler<F>
where
    F: Fn(&Arguments) -> Result<ToolCallResponse, ToolError> + Send + Sync,
{
    async fn call(&self, arguments: &Arguments) -> Result<ToolCallResponse, ToolError> {
        (self.func)(arguments)
    }
}

/// Wrap a synchronous closure as a shareable handler
pub fn handler_fn<F>(func: F) -> Arc<dyn ToolHandler>
where
    F: Fn(&Arguments) -> Result<ToolCallResponse, ToolError> + Send + Sync + 'static,
{
    Arc::new(FnHandler { func })
}

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
}

/// Ordered set of tools, looked up by name
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names are unique within a registry.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), ToolError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(ToolError::Duplicate(descriptor.name));
        }
        log::debug!("Registering tool: {}", descriptor.name);
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool { descriptor, handler });
        Ok(())
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_tool(
        mut self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<Self, ToolError> {
        self.register(descriptor, handler)?;
        Ok(self)
    }

    /// Descriptors in registration order. Each call starts a fresh iteration.
    pub fn list(&self) -> impl Iterator<Item = &ToolDescriptor> + Clone + '_ {
        self.tools.iter().map(|t| &t.descriptor)
    }

    /// Look up the handler registered under `name`
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ToolHandler>, ToolError> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i].handler))
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    /// Look up the descriptor registered under `name`
    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i].descriptor)
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list().map(|d| d.name.as_str()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ParameterSpec;
    use serde_json::json;

    fn echo() -> Arc<dyn ToolHandler> {
        handler_fn(|args| Ok(ToolCallResponse::text(serde_json::Value::Object(args.clone()).to_string())))
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDescriptor::new("alpha", "First"), echo())
            .unwrap();
        registry
            .register(
                ToolDescriptor::new("beta", "Second")
                    .with_param(ParameterSpec::string("x", "An x").required()),
                echo(),
            )
            .unwrap();
        registry
            .register(ToolDescriptor::new("gamma", "Third"), echo())
            .unwrap();
        registry
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.list().count(), 0);
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let registry = registry();
        let names: Vec<&str> = registry.list().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_list_is_restartable() {
        let registry = registry();
        let first: Vec<ToolDescriptor> = registry.list().cloned().collect();
        let second: Vec<ToolDescriptor> = registry.list().cloned().collect();
        assert_eq!(first, second);

        let iter = registry.list();
        let copy = iter.clone();
        assert_eq!(iter.count(), copy.count());
    }

    #[test]
    fn test_register_duplicate_fails() {
        let mut registry = registry();
        let err = registry
            .register(ToolDescriptor::new("beta", "Again"), echo())
            .unwrap_err();
        assert_eq!(err, ToolError::Duplicate("beta".to_string()));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.descriptor("beta").unwrap().description, "Second");
    }

    #[test]
    fn test_resolve_returns_registered_handler() {
        let handler = echo();
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDescriptor::new("echo", "Echo"), Arc::clone(&handler))
            .unwrap();

        let resolved = registry.resolve("echo").unwrap();
        assert!(Arc::ptr_eq(&resolved, &handler));
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = registry();
        assert_eq!(
            registry.resolve("delta").err(),
            Some(ToolError::NotFound("delta".to_string()))
        );
        assert!(!registry.contains("delta"));
    }

    #[tokio::test]
    async fn test_fn_handler_call() {
        let registry = registry();
        let handler = registry.resolve("beta").unwrap();
        let args = json!({"x": "y"}).as_object().cloned().unwrap();
        let response = handler.call(&args).await.unwrap();
        assert_eq!(response.text_content(), r#"{"x":"y"}"#);
    }

    #[test]
    fn test_with_tool_builder() {
        let registry = ToolRegistry::new()
            .with_tool(ToolDescriptor::new("one", "1"), echo())
            .and_then(|r| r.with_tool(ToolDescriptor::new("one", "dup"), echo()));
        assert!(matches!(registry, Err(ToolError::Duplicate(_))));
    }

    #[test]
    fn test_debug_lists_names() {
        let debug = format!("{:?}", registry());
        assert!(debug.contains("alpha"));
        assert!(debug.contains("gamma"));
    }
}
