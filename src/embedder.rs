//! Embedder Seam
//!
//! The narrow interface to the external embedding capability, plus a
//! deterministic hashed stand-in for the CLI and tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::vector::normalize_vector;

/// An external embedding capability.
///
/// Implementations are synchronous, deterministic for identical input, and
/// return exactly `dimension()` components per call. Output is expected to
/// be unit-normalized so the store's inner-product scores behave as cosine
/// similarity. The store does not verify this; breaking the contract
/// degrades ranking quality, not data integrity.
pub trait Embedder {
    /// Output dimension of every vector this embedder produces
    fn dimension(&self) -> usize;

    /// Embed a text into a fixed-length vector
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Hashed bag-of-words embedder.
///
/// Buckets lowercased whitespace tokens by hash and unit-normalizes the
/// counts. `DefaultHasher` runs with fixed keys, so output is stable
/// across processes. A stand-in for a real embedding model, not a
/// semantic one; empty input embeds to the zero vector.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.dimension == 0 {
            return Ok(Vec::new());
        }

        let mut vector = vec![0.0f32; self.dimension];
        for token in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dimension;
            vector[bucket] += 1.0;
        }

        normalize_vector(&mut vector);
        Ok(vector)
    }
}
