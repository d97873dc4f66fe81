use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Source unavailable: {source_id}: {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    #[error("Question is empty")]
    EmptyQuery,

    #[error("Vector store failure: {0}")]
    Storage(String),
}

impl Error {
    pub fn invalid_config(msg: impl Into<String>) -> Self { Self::InvalidConfiguration(msg.into()) }

    pub fn embedding(err: impl std::fmt::Display) -> Self { Self::EmbeddingUnavailable(err.to_string()) }

    pub fn storage(err: impl std::fmt::Display) -> Self { Self::Storage(err.to_string()) }
}

pub type Result<T> = std::result::Result<T, Error>;
