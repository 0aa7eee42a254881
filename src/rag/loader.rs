//! Document type and text loading

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A piece of text with free-form metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Load a UTF-8 text file as one document, tagged with its `source` path
pub fn load_text<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    log::info!("Loaded {} chars from {}", content.chars().count(), path.display());
    Ok(Document::new(content).with_metadata("source", path.display().to_string()))
}
