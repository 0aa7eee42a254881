//! RAG pipeline: offline ingestion and online question answering

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::config::RagConfig;
use crate::error::Result;
use crate::llm::{ChatModel, ChatRequest, Embedder, Message};
use crate::prompt::PromptTemplate;

use super::{RecursiveCharacterTextSplitter, ScoredDocument, VectorStore, load_text};

/// Question-answering prompt; `{{context}}` holds the retrieved chunks
pub const QA_PROMPT: &str = "You are a professional question-answering assistant. Answer the user's question using the reference documents below.
If the reference documents do not contain the relevant information, say honestly that you do not know. Do not make up an answer.

Reference documents: {{context}}

User question: {{query}}

Answer:";

/// An answer with the chunks it was grounded on
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    pub sources: Vec<ScoredDocument>,
}

pub struct RagPipeline<E: ?Sized, M: ?Sized> {
    embedder: Arc<E>,
    model: Arc<M>,
    store: VectorStore,
    splitter: RecursiveCharacterTextSplitter,
    prompt: PromptTemplate,
    top_k: usize,
}

impl<E, M> RagPipeline<E, M>
where
    E: Embedder + ?Sized,
    M: ChatModel + ?Sized,
{
    /// Open the store named in `config` and build the pipeline around it
    pub fn open(embedder: Arc<E>, model: Arc<M>, config: &RagConfig) -> Result<Self> {
        let store = VectorStore::open(&config.store_dir)?;
        let splitter = RecursiveCharacterTextSplitter::new(config.chunk_size, config.chunk_overlap)?;
        Self::new(embedder, model, store, splitter, config.top_k)
    }

    pub fn new(
        embedder: Arc<E>,
        model: Arc<M>,
        store: VectorStore,
        splitter: RecursiveCharacterTextSplitter,
        top_k: usize,
    ) -> Result<Self> {
        Ok(Self {
            embedder,
            model,
            store,
            splitter,
            prompt: PromptTemplate::new(QA_PROMPT)?,
            top_k,
        })
    }

    /// Replace the QA prompt; it must use `{{context}}` and `{{query}}`
    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Load, split, embed, store, and persist a text file; returns the chunk count
    pub async fn ingest<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let document = load_text(path)?;
        let chunks = self.splitter.split_documents(&[document]);
        log::info!("Split into {} chunks", chunks.len());

        let added = self.store.add_documents(&*self.embedder, chunks).await?;
        self.store.persist()?;
        Ok(added)
    }

    /// Retrieve the top-k chunks for `query` and ask the model to answer from them
    pub async fn answer(&self, query: &str) -> Result<RagAnswer> {
        let sources = self
            .store
            .similarity_search(&*self.embedder, query, self.top_k)
            .await?;
        log::debug!("Retrieved {} chunks for query", sources.len());

        let context = sources
            .iter()
            .map(|hit| hit.document.page_content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = self.prompt.format(&json!({ "context": context, "query": query }))?;

        let request = ChatRequest::new(vec![Message::user(prompt)]).with_temperature(0.0);
        let response = self.model.complete(request).await?;

        Ok(RagAnswer {
            answer: response.content.unwrap_or_default(),
            sources,
        })
    }
}
