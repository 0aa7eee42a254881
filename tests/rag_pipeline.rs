//! RAG integration tests
//!
//! Uses a deterministic bag-of-keywords embedder and temporary store directories.

use std::fs;
use std::sync::Arc;

use agentlab::config::RagConfig;
use agentlab::llm::{ChatResponse, Embedder, LlmError, ScriptedModel};
use agentlab::rag::{RagPipeline, RecursiveCharacterTextSplitter, VectorStore, load_text};
use async_trait::async_trait;
use tempfile::TempDir;

const KEYWORDS: [&str; 4] = ["rag", "rust", "pasta", "weather"];

/// One dimension per keyword, counting occurrences
struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Ok(inputs
            .iter()
            .map(|text| {
                let text = text.to_lowercase();
                KEYWORDS.iter().map(|k| text.matches(k).count() as f32).collect()
            })
            .collect())
    }
}

const KNOWLEDGE: &str = "RAG combines retrieval with generation. A RAG system looks up documents first.

Rust is a systems programming language focused on safety.

Pasta should be cooked in salted boiling water.";

fn config(dir: &TempDir) -> RagConfig {
    RagConfig {
        chunk_size: 80,
        chunk_overlap: 0,
        top_k: 2,
        store_dir: dir.path().join("vector_store"),
    }
}

#[tokio::test]
async fn test_ingest_persists_and_reopens() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("knowledge.txt");
    fs::write(&file, KNOWLEDGE).unwrap();
    let config = config(&dir);

    let model = Arc::new(ScriptedModel::new(vec![]));
    let mut pipeline = RagPipeline::open(Arc::new(KeywordEmbedder), model, &config).unwrap();
    let added = pipeline.ingest(&file).await.unwrap();
    assert_eq!(added, 3);

    let store = VectorStore::open(&config.store_dir).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.dimension(), Some(KEYWORDS.len()));
    let record = &store.records()[1];
    assert!(record.document.page_content.starts_with("Rust"));
    assert_eq!(record.document.metadata["chunk"], 1);
    assert!(record.document.metadata["source"].as_str().unwrap().ends_with("knowledge.txt"));
}

#[tokio::test]
async fn test_answer_uses_most_similar_chunks() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("knowledge.txt");
    fs::write(&file, KNOWLEDGE).unwrap();
    let config = config(&dir);

    // Ingest with one pipeline, answer with another over the persisted store
    {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let mut pipeline = RagPipeline::open(Arc::new(KeywordEmbedder), model, &config).unwrap();
        pipeline.ingest(&file).await.unwrap();
    }

    let model = Arc::new(ScriptedModel::new(vec![ChatResponse::text(
        "RAG retrieves documents before generating.",
    )]));
    let pipeline = RagPipeline::open(Arc::new(KeywordEmbedder), model.clone(), &config).unwrap();
    let answer = pipeline.answer("What does a RAG system do?").await.unwrap();

    assert_eq!(answer.answer, "RAG retrieves documents before generating.");
    assert_eq!(answer.sources.len(), 2);
    assert!(answer.sources[0].document.page_content.starts_with("RAG combines"));
    assert!(answer.sources[0].score > answer.sources[1].score);

    let requests = model.requests();
    let prompt = &requests[0].messages[0].content;
    assert!(prompt.contains("RAG combines retrieval with generation."));
    assert!(prompt.contains("User question: What does a RAG system do?"));
}

#[test]
fn test_load_and_split_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, KNOWLEDGE).unwrap();

    let document = load_text(&file).unwrap();
    assert_eq!(document.page_content, KNOWLEDGE);

    let splitter = RecursiveCharacterTextSplitter::new(80, 0).unwrap();
    let chunks = splitter.split_documents(&[document]);
    assert_eq!(chunks.len(), 3);
    assert!(chunks.iter().all(|c| c.page_content.chars().count() <= 80));
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(load_text(dir.path().join("missing.txt")).is_err());
}

#[test]
fn test_open_rejects_bad_splitter_settings() {
    let dir = TempDir::new().unwrap();
    let config = RagConfig {
        chunk_size: 10,
        chunk_overlap: 10,
        ..config(&dir)
    };
    let model = Arc::new(ScriptedModel::new(vec![]));
    assert!(RagPipeline::open(Arc::new(KeywordEmbedder), model, &config).is_err());
}
