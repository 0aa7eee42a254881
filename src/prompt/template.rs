//! Prompt templates with `{{var}}` placeholders

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{AgentlabError, Result};
use crate::llm::{Message, Role};

use super::PromptRenderer;

const TEMPLATE_NAME: &str = "prompt";

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("variable pattern is valid")
});

fn variables_in(source: &str) -> BTreeSet<String> {
    VARIABLE
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// A single-string prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    source: String,
    renderer: PromptRenderer,
}

impl PromptTemplate {
    /// Parse a template; syntax errors are reported here, not at render time
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut renderer = PromptRenderer::new();
        renderer.register_template(TEMPLATE_NAME, &source)?;
        Ok(Self { source, renderer })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names, sorted and de-duplicated
    pub fn input_variables(&self) -> Vec<String> {
        variables_in(&self.source).into_iter().collect()
    }

    /// Fill in the placeholders. Every placeholder needs a value.
    pub fn format<T: Serialize>(&self, variables: &T) -> Result<String> {
        self.renderer.render_named(TEMPLATE_NAME, variables)
    }
}

/// An ordered list of role-tagged templates rendered into chat messages
#[derive(Debug, Clone)]
pub struct ChatPromptTemplate {
    messages: Vec<(Role, PromptTemplate)>,
}

impl ChatPromptTemplate {
    /// Build from `(role, template)` pairs. Tool-role entries are rejected.
    pub fn from_messages<S, I>(messages: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (Role, S)>,
    {
        let messages = messages
            .into_iter()
            .map(|(role, source)| {
                if role == Role::Tool {
                    return Err(AgentlabError::Template(
                        "chat prompt templates cannot contain tool messages".to_string(),
                    ));
                }
                Ok((role, PromptTemplate::new(source)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { messages })
    }

    /// Placeholder names across all messages, sorted and de-duplicated
    pub fn input_variables(&self) -> Vec<String> {
        self.messages
            .iter()
            .flat_map(|(_, template)| variables_in(template.source()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Render every template into a message of its role
    pub fn format_messages<T: Serialize>(&self, variables: &T) -> Result<Vec<Message>> {
        self.messages
            .iter()
            .map(|(role, template)| {
                let content = template.format(variables)?;
                Ok(match role {
                    Role::System => Message::system(content),
                    Role::Assistant => Message::assistant(content),
                    _ => Message::user(content),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_prompt_template_format() {
        let template = PromptTemplate::new("Context: {{context}}\nQuestion: {{query}}").unwrap();
        assert_eq!(template.input_variables(), vec!["context", "query"]);

        let rendered = template
            .format(&json!({ "context": "RAG retrieves documents.", "query": "What is RAG?" }))
            .unwrap();
        assert_eq!(rendered, "Context: RAG retrieves documents.\nQuestion: What is RAG?");
    }

    #[test]
    fn test_prompt_template_missing_variable() {
        let template = PromptTemplate::new("Hello {{name}}").unwrap();
        let vars: HashMap<String, String> = HashMap::new();
        assert!(matches!(template.format(&vars), Err(AgentlabError::Template(_))));
    }

    #[test]
    fn test_prompt_template_invalid_syntax() {
        assert!(PromptTemplate::new("{{#each}}").is_err());
    }

    #[test]
    fn test_input_variables_deduplicated() {
        let template = PromptTemplate::new("{{b}} {{a}} {{ b }}").unwrap();
        assert_eq!(template.input_variables(), vec!["a", "b"]);
    }

    #[test]
    fn test_chat_prompt_template() {
        let prompt = ChatPromptTemplate::from_messages([
            (Role::System, "You are a joke master. Tell me a joke."),
            (Role::User, "Write a joke about {{topic}}"),
        ])
        .unwrap();
        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt.input_variables(), vec!["topic"]);

        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), "dogs".to_string());
        let messages = prompt.format_messages(&vars).unwrap();

        assert_eq!(messages[0], Message::system("You are a joke master. Tell me a joke."));
        assert_eq!(messages[1], Message::user("Write a joke about dogs"));
    }

    #[test]
    fn test_chat_prompt_rejects_tool_role() {
        let result = ChatPromptTemplate::from_messages([(Role::Tool, "x")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_chat_prompt_assistant_role() {
        let prompt = ChatPromptTemplate::from_messages([(Role::Assistant, "Earlier: {{x}}")]).unwrap();
        let messages = prompt.format_messages(&json!({ "x": 1 })).unwrap();
        assert_eq!(messages, vec![Message::assistant("Earlier: 1")]);
    }
}
