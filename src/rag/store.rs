//! Flat vector store persisted as JSON
//!
//! Records are scanned linearly on every search; there is no index.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AgentlabError, Result};
use crate::llm::Embedder;

use super::{Document, cosine_similarity};

const STORE_FILE: &str = "store.json";

/// A stored chunk and its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// A search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    dimension: Option<usize>,
    records: Vec<StoredRecord>,
}

#[derive(Debug)]
pub struct VectorStore {
    dir: PathBuf,
    dimension: Option<usize>,
    records: Vec<StoredRecord>,
}

impl VectorStore {
    /// Open the store in `dir`, loading `store.json` when present
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(STORE_FILE);

        let file = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&content)
                .map_err(|e| AgentlabError::Store(format!("corrupt store {}: {}", path.display(), e)))?;
            log::info!("Loaded {} records from {}", file.records.len(), path.display());
            file
        } else {
            log::debug!("No store at {}, starting empty", path.display());
            StoreFile::default()
        };

        Ok(Self {
            dir,
            dimension: file.dimension,
            records: file.records,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    /// Embed and append documents; returns how many were added
    pub async fn add_documents<E>(&mut self, embedder: &E, documents: Vec<Document>) -> Result<usize>
    where
        E: Embedder + ?Sized,
    {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
        let embeddings = embedder.embed(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(AgentlabError::Store(format!(
                "embedder returned {} vectors for {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let expected = self.dimension.or_else(|| embeddings.first().map(Vec::len));
        if let Some(bad) = embeddings.iter().find(|e| Some(e.len()) != expected) {
            return Err(AgentlabError::Store(format!(
                "embedding dimension {} does not match store dimension {}",
                bad.len(),
                expected.unwrap_or_default()
            )));
        }
        self.dimension = expected;

        let added = documents.len();
        for (document, embedding) in documents.into_iter().zip(embeddings) {
            let id = format!("chunk-{:06}", self.records.len());
            self.records.push(StoredRecord { id, document, embedding });
        }
        log::info!("Added {} records ({} total)", added, self.records.len());
        Ok(added)
    }

    /// Top `k` records by cosine similarity to `query`
    pub async fn similarity_search<E>(&self, embedder: &E, query: &str, k: usize) -> Result<Vec<ScoredDocument>>
    where
        E: Embedder + ?Sized,
    {
        let mut vectors = embedder.embed(&[query.to_string()]).await?;
        let query_vector = vectors
            .pop()
            .ok_or_else(|| AgentlabError::Store("embedder returned no vector for the query".to_string()))?;
        self.similarity_search_by_vector(&query_vector, k)
    }

    /// Top `k` records by cosine similarity; ties keep insertion order
    pub fn similarity_search_by_vector(&self, query: &[f32], k: usize) -> Result<Vec<ScoredDocument>> {
        let mut scored = self
            .records
            .iter()
            .map(|record| -> Result<(f32, &StoredRecord)> {
                Ok((cosine_similarity(query, &record.embedding)?, record))
            })
            .collect::<Result<Vec<_>>>()?;

        // Stable sort keeps insertion order among equal scores; NaN ranks last
        let rank = |score: f32| if score.is_nan() { f32::NEG_INFINITY } else { score };
        scored.sort_by(|a, b| rank(b.0).total_cmp(&rank(a.0)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(score, record)| ScoredDocument {
                document: record.document.clone(),
                score,
            })
            .collect())
    }

    /// Write `store.json` via a temp file and rename
    pub fn persist(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(STORE_FILE);
        let tmp = self.dir.join(format!("{}.tmp", STORE_FILE));

        let file = StoreFileRef {
            dimension: self.dimension,
            records: &self.records,
        };
        fs::write(&tmp, serde_json::to_vec(&file)?)?;
        fs::rename(&tmp, &path)?;

        log::info!("Persisted {} records to {}", self.records.len(), path.display());
        Ok(())
    }
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    dimension: Option<usize>,
    records: &'a [StoredRecord],
}
