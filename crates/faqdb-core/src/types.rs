//! Domain types shared by the chunker, the stores and the retrieval engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type ChunkId = String;
pub type Meta = HashMap<String, String>;

pub const META_SOURCE: &str = "source";
pub const META_CHUNK_INDEX: &str = "chunk_index";
pub const META_TOTAL_CHUNKS: &str = "total_chunks";

/// Derive the stable id of the `index`-th chunk of `source_id`.
///
/// Re-ingesting the same source yields the same ids, which lets stores
/// overwrite instead of accumulating duplicates.
pub fn chunk_id(source_id: &str, index: usize) -> ChunkId { format!("{}:{}", source_id, index) }

/// A slice of a source document that is independently embedded and stored.
///
/// - `id`: see [`chunk_id`]
/// - `source_id`: originating document (usually the file path)
/// - `text`: the literal, non-empty chunk content
/// - `chunk_index`/`total_chunks`: position within the parent document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: ChunkId,
    pub source_id: String,
    pub text: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

impl DocumentChunk {
    /// Metadata written alongside the chunk: `source` plus its position.
    pub fn metadata(&self) -> Meta {
        let mut meta = Meta::new();
        meta.insert(META_SOURCE.to_string(), self.source_id.clone());
        meta.insert(META_CHUNK_INDEX.to_string(), self.chunk_index.to_string());
        meta.insert(META_TOTAL_CHUNKS.to_string(), self.total_chunks.to_string());
        meta
    }
}

/// One ranked result from a vector store.
///
/// `score` is cosine similarity; higher is always better. `vector` is the
/// embedding exactly as it was passed to `add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: ChunkId,
    pub text: String,
    pub metadata: Meta,
    pub score: f32,
    pub vector: Vec<f32>,
}

impl SearchHit {
    pub fn source(&self) -> Option<&str> { self.metadata.get(META_SOURCE).map(String::as_str) }
}

/// Outcome of ingesting one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub source_id: String,
    pub chunks: usize,
}
