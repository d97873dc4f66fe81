use arrow_schema::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

pub const VECTOR_COLUMN: &str = "vector";

pub fn build_chunk_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("source", DataType::Utf8, false),
		Field::new("text", DataType::Utf8, false),
		Field::new("metadata", DataType::Utf8, false),
		Field::new("seq", DataType::Int64, false),
		Field::new("ingested_at", DataType::Timestamp(TimeUnit::Millisecond, None), false),
		Field::new(VECTOR_COLUMN, DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}

/// Dimensionality of the vector column of an existing table.
pub fn vector_dim(schema: &Schema) -> Option<usize> {
	match schema.field_with_name(VECTOR_COLUMN).ok()?.data_type() {
		DataType::FixedSizeList(_, n) => usize::try_from(*n).ok(),
		_ => None,
	}
}
