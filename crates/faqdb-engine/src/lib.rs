//! Retrieval pipeline: ingestion into a vector store and extractive answers.

pub mod answer;
pub mod context;
pub mod engine;

pub use answer::{Retrieval, ANSWER_LABEL, NOT_FOUND_ANSWER};
pub use context::{Resources, StoreHandle};
pub use engine::RetrievalEngine;
