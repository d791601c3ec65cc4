//! Clients for the remote document store

pub mod memory;
pub mod remote;

pub use memory::MemoryDocumentStore;
pub use remote::{Document, DocumentStore, RestDocumentStore};
