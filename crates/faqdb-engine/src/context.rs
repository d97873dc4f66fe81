//! Long-lived resources built once at startup and handed to the engine.

use faqdb_core::config::{Settings, StoreBackend};
use faqdb_core::traits::{Embedder, VectorStore};
use faqdb_core::types::{Meta, SearchHit};
use faqdb_core::Result;
use faqdb_embed::get_default_embedder;
use faqdb_vector::{InMemoryStore, LanceStore};

pub struct Resources<S> {
    pub embedder: Box<dyn Embedder>,
    pub store: S,
}

impl<S: VectorStore> Resources<S> {
    pub fn new(embedder: Box<dyn Embedder>, store: S) -> Self { Self { embedder, store } }
}

/// The store selected by `store.backend`.
pub enum StoreHandle {
    Memory(InMemoryStore),
    Lance(LanceStore),
}

impl StoreHandle {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store = &settings.store;
        Ok(match store.backend {
            StoreBackend::Memory => Self::Memory(store.dim.map(InMemoryStore::with_dim).unwrap_or_default()),
            StoreBackend::Lance => Self::Lance(LanceStore::open(&store.path, &store.table, store.dim)?),
        })
    }

    fn inner(&self) -> &dyn VectorStore {
        match self {
            Self::Memory(s) => s,
            Self::Lance(s) => s,
        }
    }
}

impl VectorStore for StoreHandle {
    fn add(&self, id: &str, vector: &[f32], text: &str, metadata: &Meta) -> Result<()> { self.inner().add(id, vector, text, metadata) }
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> { self.inner().search(query, k) }
    fn len(&self) -> Result<usize> { self.inner().len() }
    fn dim(&self) -> Option<usize> { self.inner().dim() }
}

impl Resources<StoreHandle> {
    /// Load the embedding model and open the configured store.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let embedder = get_default_embedder(&settings.embedding)?;
        let store = StoreHandle::from_settings(settings)?;
        tracing::info!(backend = ?settings.store.backend, dim = embedder.dim(), "resources ready");
        Ok(Self { embedder, store })
    }
}
