use std::path::Path;

use faqdb_core::chunker::{ChunkingConfig, TextChunker};
use faqdb_core::config::{RetrievalConfig, Settings};
use faqdb_core::source::{list_txt_files, read_source};
use faqdb_core::traits::{Embedder, VectorStore};
use faqdb_core::types::IngestReport;
use faqdb_core::{Error, Result};

use crate::answer::Retrieval;
use crate::context::Resources;

/// Chunk → embed → store on the way in; embed → search → assemble on the way out.
pub struct RetrievalEngine<S: VectorStore> {
    embedder: Box<dyn Embedder>,
    store: S,
    chunker: TextChunker,
    retrieval: RetrievalConfig,
}

impl<S: VectorStore> RetrievalEngine<S> {
    pub fn new(resources: Resources<S>, chunking: ChunkingConfig, retrieval: RetrievalConfig) -> Result<Self> {
        retrieval.validate()?;
        let chunker = TextChunker::new(chunking)?;
        let Resources { embedder, store } = resources;
        if let Some(expected) = store.dim() {
            if expected != embedder.dim() {
                return Err(Error::DimensionMismatch { expected, actual: embedder.dim() });
            }
        }
        Ok(Self { embedder, store, chunker, retrieval })
    }

    pub fn from_settings(resources: Resources<S>, settings: &Settings) -> Result<Self> {
        Self::new(resources, settings.chunking, settings.retrieval)
    }

    pub fn store(&self) -> &S { &self.store }

    pub fn default_k(&self) -> usize { self.retrieval.top_k }

    /// Index `raw_text` under `source_id`.
    ///
    /// Chunks are embedded and stored one at a time. On failure the chunks
    /// already stored stay stored and the error is returned; re-running is
    /// safe because ids are stable and the store overwrites by id.
    pub fn ingest(&self, source_id: &str, raw_text: &str) -> Result<IngestReport> {
        let chunks = self.chunker.chunk_document(source_id, raw_text);
        if chunks.is_empty() { tracing::warn!(source = source_id, "source is empty, nothing to ingest"); }
        for chunk in &chunks {
            let vector = self.embedder.embed(&chunk.text)?;
            self.store.add(&chunk.id, &vector, &chunk.text, &chunk.metadata())?;
            tracing::debug!(id = %chunk.id, chars = chunk.text.chars().count(), "chunk stored");
        }
        tracing::info!(source = source_id, chunks = chunks.len(), "ingested");
        Ok(IngestReport { source_id: source_id.to_string(), chunks: chunks.len() })
    }

    /// Read `path` fully and ingest it with the path as source id.
    pub fn ingest_path(&self, path: &Path) -> Result<IngestReport> {
        let text = read_source(path)?;
        self.ingest(&path.display().to_string(), &text)
    }

    /// Ingest every `.txt` file under `dir`, stopping at the first failure.
    pub fn ingest_dir(&self, dir: &Path) -> Result<Vec<IngestReport>> {
        let files = list_txt_files(dir)?;
        if files.is_empty() { tracing::warn!(dir = %dir.display(), "no .txt files found"); }
        files.iter().map(|f| self.ingest_path(f)).collect()
    }

    /// Rank the top `k` chunks for `question` and assemble their context.
    pub fn retrieve(&self, question: &str, k: usize) -> Result<Retrieval> {
        if question.trim().is_empty() { return Err(Error::EmptyQuery); }
        if k == 0 { return Err(Error::invalid_config("k must be greater than 0")); }
        let query = self.embedder.embed(question)?;
        let hits = self.store.search(&query, k)?;
        let retrieval = Retrieval::from_hits(hits, self.retrieval.min_score);
        tracing::info!(k, hits = retrieval.hits.len(), found = retrieval.is_found(), "question answered");
        Ok(retrieval)
    }

    /// The labelled context for `question`, or the not-found sentinel.
    pub fn answer(&self, question: &str, k: usize) -> Result<String> {
        Ok(self.retrieve(question, k)?.render())
    }

    /// [`Self::answer`] with the configured `retrieval.top_k`.
    pub fn answer_default(&self, question: &str) -> Result<String> { self.answer(question, self.retrieval.top_k) }
}
