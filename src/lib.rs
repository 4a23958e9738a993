//! MEMVEX - Durable Vector Memory
//!
//! A flat-index embedding store for retrieval-augmented agents: insert
//! fixed-dimension embeddings with opaque metadata, snapshot them
//! atomically to a two-artifact pair on disk, and answer exact
//! nearest-neighbor queries by inner product.

pub mod embedder;
pub mod error;
pub mod memory;
pub mod persistence;
pub mod vector;

pub use embedder::{Embedder, HashEmbedder};
pub use error::{MemoryError, Result};
pub use memory::Memory;
pub use persistence::Snapshot;
pub use vector::{Metadata, Record, SearchHit, StoreConfig, VectorStore};
