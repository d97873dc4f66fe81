//! Persistent store backed by a LanceDB table.
//!
//! The public API is synchronous: the store owns a single-threaded tokio
//! runtime and blocks on it, so it must not be called from inside another
//! tokio runtime. Searches are exact scans ranked with [`crate::scoring`],
//! which keeps results identical to [`crate::InMemoryStore`] for the same data.

use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, Int64Array, RecordBatch, RecordBatchIterator, StringArray, TimestampMillisecondArray};
use chrono::Utc;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table};
use std::sync::{Arc, Mutex, MutexGuard};

use faqdb_core::traits::VectorStore;
use faqdb_core::types::{Meta, SearchHit, META_SOURCE};
use faqdb_core::{Error, Result};

use crate::schema::{build_chunk_schema, vector_dim, VECTOR_COLUMN};
use crate::scoring::{cosine_similarity, rank, Candidate};
use crate::table::{i64_col, open_db, open_table, scan, string_col, vector_at};

struct State {
    dim: Option<usize>,
    next_seq: u64,
}

pub struct LanceStore {
    rt: tokio::runtime::Runtime,
    db: Connection,
    table_name: String,
    state: Mutex<State>,
}

impl LanceStore {
    /// Open (or lazily create on first `add`) `table_name` under `uri`.
    ///
    /// An existing table fixes the dimensionality; a configured `dim` that
    /// disagrees with it is a `DimensionMismatch`.
    pub fn open(uri: &str, table_name: &str, dim: Option<usize>) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(Error::storage)?;
        let db = rt.block_on(open_db(uri))?;
        let mut state = State { dim, next_seq: 0 };
        if let Some(table) = rt.block_on(open_table(&db, table_name))? {
            let schema = rt.block_on(table.schema()).map_err(Error::storage)?;
            match (dim, vector_dim(&schema)) {
                (Some(expected), Some(actual)) if expected != actual => return Err(Error::DimensionMismatch { expected, actual }),
                (None, stored) => state.dim = stored,
                _ => {}
            }
            for batch in rt.block_on(scan(&table))? {
                let seqs = i64_col(&batch, "seq")?;
                for i in 0..batch.num_rows() {
                    let next = u64::try_from(seqs.value(i)).unwrap_or(0) + 1;
                    state.next_seq = state.next_seq.max(next);
                }
            }
            tracing::info!(uri, table = table_name, dim = ?state.dim, "opened existing LanceDB table");
        }
        Ok(Self { rt, db, table_name: table_name.to_string(), state: Mutex::new(state) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> { self.state.lock().map_err(|_| Error::storage("lance store lock poisoned")) }

    async fn existing_seq(table: &Table, id: &str) -> Result<Option<u64>> {
        let filter = format!("id = '{}'", id.replace('\'', "''"));
        let mut stream = table.query().only_if(filter).execute().await.map_err(Error::storage)?;
        while let Some(batch) = futures::TryStreamExt::try_next(&mut stream).await.map_err(Error::storage)? {
            if batch.num_rows() == 0 { continue; }
            return Ok(u64::try_from(i64_col(&batch, "seq")?.value(0)).ok());
        }
        Ok(None)
    }

    fn to_record_batch(dim: usize, id: &str, vector: &[f32], text: &str, metadata: &Meta, seq: u64) -> Result<RecordBatch> {
        let dim = i32::try_from(dim).map_err(|_| Error::invalid_config(format!("dimension {} too large", dim)))?;
        let source = metadata.get(META_SOURCE).cloned().unwrap_or_default();
        let meta_json = serde_json::to_string(metadata).map_err(Error::storage)?;
        let seq = i64::try_from(seq).map_err(Error::storage)?;
        let vectors = vec![Some(vector.iter().map(|&x| Some(x)).collect::<Vec<_>>())];
        RecordBatch::try_new(build_chunk_schema(dim), vec![
            Arc::new(StringArray::from(vec![id.to_string()])),
            Arc::new(StringArray::from(vec![source])),
            Arc::new(StringArray::from(vec![text.to_string()])),
            Arc::new(StringArray::from(vec![meta_json])),
            Arc::new(Int64Array::from(vec![seq])),
            Arc::new(TimestampMillisecondArray::from(vec![Utc::now().timestamp_millis()])),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors, dim)),
        ]).map_err(Error::storage)
    }
}

impl VectorStore for LanceStore {
    fn add(&self, id: &str, vector: &[f32], text: &str, metadata: &Meta) -> Result<()> {
        let mut state = self.lock()?;
        let dim = match state.dim {
            Some(expected) if expected != vector.len() => return Err(Error::DimensionMismatch { expected, actual: vector.len() }),
            Some(expected) => expected,
            None if vector.is_empty() => return Err(Error::invalid_config("cannot store an empty vector")),
            None => vector.len(),
        };
        let table = self.rt.block_on(open_table(&self.db, &self.table_name))?;
        let existing = match &table {
            Some(t) => self.rt.block_on(Self::existing_seq(t, id))?,
            None => None,
        };
        let seq = existing.unwrap_or(state.next_seq);
        let batch = Self::to_record_batch(dim, id, vector, text, metadata, seq)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        self.rt.block_on(async {
            match table {
                Some(t) => {
                    // Upsert: id is unique
                    let mut mi = t.merge_insert(&["id"]);
                    mi.when_matched_update_all(None).when_not_matched_insert_all();
                    let _ = mi.execute(reader).await.map_err(Error::storage)?;
                }
                None => {
                    self.db.create_table(&self.table_name, reader).execute().await.map_err(Error::storage)?;
                    tracing::info!(table = %self.table_name, dim, "created LanceDB table");
                }
            }
            Ok::<(), Error>(())
        })?;
        state.dim = Some(dim);
        if existing.is_none() { state.next_seq += 1; } else { tracing::debug!(id, "overwrote existing record"); }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 { return Err(Error::invalid_config("k must be greater than 0")); }
        let state = self.lock()?;
        if let Some(expected) = state.dim {
            if expected != query.len() { return Err(Error::DimensionMismatch { expected, actual: query.len() }); }
        }
        let Some(table) = self.rt.block_on(open_table(&self.db, &self.table_name))? else { return Ok(Vec::new()) };
        let mut candidates = Vec::new();
        for batch in self.rt.block_on(scan(&table))? {
            let ids = string_col(&batch, "id")?;
            let texts = string_col(&batch, "text")?;
            let metas = string_col(&batch, "metadata")?;
            let seqs = i64_col(&batch, "seq")?;
            for i in 0..batch.num_rows() {
                let vector = vector_at(&batch, VECTOR_COLUMN, i)?;
                let metadata: Meta = serde_json::from_str(metas.value(i)).map_err(Error::storage)?;
                candidates.push(Candidate {
                    seq: u64::try_from(seqs.value(i)).unwrap_or(u64::MAX),
                    hit: SearchHit { id: ids.value(i).to_string(), text: texts.value(i).to_string(), metadata, score: cosine_similarity(query, &vector), vector },
                });
            }
        }
        Ok(rank(candidates, k))
    }

    fn len(&self) -> Result<usize> {
        let Some(table) = self.rt.block_on(open_table(&self.db, &self.table_name))? else { return Ok(0) };
        self.rt.block_on(table.count_rows(None)).map_err(Error::storage)
    }

    fn dim(&self) -> Option<usize> { self.state.lock().ok().and_then(|s| s.dim) }
}
