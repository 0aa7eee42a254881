//! Prompt System - Template rendering
//!
//! This module provides prompt templates with `{{variable}}` placeholders,
//! rendered using Handlebars.

mod render;
mod template;

pub use render::PromptRenderer;
pub use template::{ChatPromptTemplate, PromptTemplate};
