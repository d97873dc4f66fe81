//! Vector store backends implementing `faqdb_core::traits::VectorStore`.

pub mod lance;
pub mod memory;
pub mod schema;
pub mod scoring;
pub mod table;

pub use lance::LanceStore;
pub use memory::InMemoryStore;
