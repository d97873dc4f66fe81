//! LanceDB connection helpers and Arrow column accessors.

use arrow_array::cast::AsArray;
use arrow_array::{Array, FixedSizeListArray, Int64Array, RecordBatch, StringArray};
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, Table};

use faqdb_core::{Error, Result};

pub async fn open_db(uri: &str) -> Result<Connection> {
    connect(uri).execute().await.map_err(Error::storage)
}

/// Open `name` if it exists.
pub async fn open_table(conn: &Connection, name: &str) -> Result<Option<Table>> {
    let names = conn.table_names().execute().await.map_err(Error::storage)?;
    if !names.iter().any(|n| n == name) { return Ok(None); }
    Ok(Some(conn.open_table(name).execute().await.map_err(Error::storage)?))
}

/// Every record batch of a full table scan. The row count is passed as an
/// explicit limit so no default query limit can truncate the scan.
pub async fn scan(table: &Table) -> Result<Vec<RecordBatch>> {
    let rows = table.count_rows(None).await.map_err(Error::storage)?;
    if rows == 0 { return Ok(Vec::new()); }
    let mut stream = table.query().limit(rows).execute().await.map_err(Error::storage)?;
    let mut batches = Vec::new();
    while let Some(batch) = futures::TryStreamExt::try_next(&mut stream).await.map_err(Error::storage)? {
        batches.push(batch);
    }
    Ok(batches)
}

pub fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch.column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::storage(format!("column '{}' missing or not utf8", name)))
}

pub fn i64_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int64Array> {
    batch.column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
        .ok_or_else(|| Error::storage(format!("column '{}' missing or not int64", name)))
}

pub fn vector_at(batch: &RecordBatch, name: &str, row: usize) -> Result<Vec<f32>> {
    let col = batch.column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
        .ok_or_else(|| Error::storage(format!("column '{}' missing or not a fixed size list", name)))?;
    if col.is_null(row) { return Err(Error::storage(format!("null vector at row {}", row))); }
    Ok(col.value(row).as_primitive::<arrow_array::types::Float32Type>().values().to_vec())
}
