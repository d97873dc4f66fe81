use crate::error::Result;
use crate::types::{Meta, SearchHit};

/// Text to fixed-length vector. Implementations must be deterministic for a
/// given instance and always return `dim()` values.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Persistent (or in-process) nearest-neighbour store.
///
/// `add` overwrites an existing record with the same id. `search` returns at
/// most `k` hits ordered by descending cosine similarity, earlier insertions
/// first on exact ties.
pub trait VectorStore: Send + Sync {
    fn add(&self, id: &str, vector: &[f32], text: &str, metadata: &Meta) -> Result<()>;
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>>;
    fn len(&self) -> Result<usize>;
    /// Dimensionality established so far, if any record or config fixed it.
    fn dim(&self) -> Option<usize>;
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn dim(&self) -> usize { (**self).dim() }
    fn embed(&self, text: &str) -> Result<Vec<f32>> { (**self).embed(text) }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { (**self).embed_batch(texts) }
}

impl<T: VectorStore + ?Sized> VectorStore for Box<T> {
    fn add(&self, id: &str, vector: &[f32], text: &str, metadata: &Meta) -> Result<()> { (**self).add(id, vector, text, metadata) }
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> { (**self).search(query, k) }
    fn len(&self) -> Result<usize> { (**self).len() }
    fn dim(&self) -> Option<usize> { (**self).dim() }
}
