//! Retrieval-augmented generation
//!
//! Offline: load a text file, split it into chunks, embed the chunks, and store
//! them. Online: embed the query, fetch the most similar chunks, and have the
//! model answer from them.

mod loader;
mod pipeline;
mod splitter;
mod store;
mod vectors;

pub use loader::{Document, load_text};
pub use pipeline::{QA_PROMPT, RagAnswer, RagPipeline};
pub use splitter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, RecursiveCharacterTextSplitter};
pub use store::{ScoredDocument, StoredRecord, VectorStore};
pub use vectors::{cosine_similarity, dot_product, magnitude};
