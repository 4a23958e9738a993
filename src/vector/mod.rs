//! Vector Module
//!
//! Flat-index vector storage and scoring.

mod similarity;
mod store;

pub use similarity::{dot_product, magnitude, normalize_vector, normalized};
pub use store::{Metadata, Record, SearchHit, StoreConfig, VectorStore};
