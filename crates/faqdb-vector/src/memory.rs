use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use faqdb_core::traits::VectorStore;
use faqdb_core::types::{Meta, SearchHit};
use faqdb_core::{Error, Result};

use crate::scoring::{cosine_similarity, rank, Candidate};

struct Record {
    id: String,
    vector: Vec<f32>,
    text: String,
    metadata: Meta,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    records: Vec<Record>,
    by_id: HashMap<String, usize>,
    dim: Option<usize>,
    next_seq: u64,
}

/// Process-local store answering queries by exact linear scan.
///
/// Re-adding an id replaces its vector, text and metadata in place; the
/// record keeps its original insertion position for tie-breaking.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self { Self::default() }

    /// A store whose dimensionality is fixed before the first `add`.
    pub fn with_dim(dim: usize) -> Self {
        Self { inner: RwLock::new(Inner { dim: Some(dim), ..Inner::default() }) }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> { self.inner.read().map_err(|_| Error::storage("in-memory store lock poisoned")) }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> { self.inner.write().map_err(|_| Error::storage("in-memory store lock poisoned")) }
}

impl VectorStore for InMemoryStore {
    fn add(&self, id: &str, vector: &[f32], text: &str, metadata: &Meta) -> Result<()> {
        let mut inner = self.write()?;
        let current = inner.dim;
        match current {
            Some(expected) if expected != vector.len() => return Err(Error::DimensionMismatch { expected, actual: vector.len() }),
            Some(_) => {}
            None if vector.is_empty() => return Err(Error::invalid_config("cannot store an empty vector")),
            None => inner.dim = Some(vector.len()),
        }
        if let Some(pos) = inner.by_id.get(id).copied() {
            let record = &mut inner.records[pos];
            record.vector = vector.to_vec();
            record.text = text.to_string();
            record.metadata = metadata.clone();
            tracing::debug!(id, "overwrote existing record");
            return Ok(());
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let pos = inner.records.len();
        inner.records.push(Record { id: id.to_string(), vector: vector.to_vec(), text: text.to_string(), metadata: metadata.clone(), seq });
        inner.by_id.insert(id.to_string(), pos);
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 { return Err(Error::invalid_config("k must be greater than 0")); }
        let inner = self.read()?;
        if let Some(expected) = inner.dim {
            if expected != query.len() { return Err(Error::DimensionMismatch { expected, actual: query.len() }); }
        }
        let candidates = inner
            .records
            .iter()
            .map(|r| Candidate {
                seq: r.seq,
                hit: SearchHit { id: r.id.clone(), text: r.text.clone(), metadata: r.metadata.clone(), score: cosine_similarity(query, &r.vector), vector: r.vector.clone() },
            })
            .collect();
        Ok(rank(candidates, k))
    }

    fn len(&self) -> Result<usize> { Ok(self.read()?.records.len()) }

    fn dim(&self) -> Option<usize> { self.inner.read().ok().and_then(|i| i.dim) }
}
