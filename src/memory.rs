//! Memory Façade
//!
//! Embed-then-store orchestration over the vector memory store.

use crate::embedder::Embedder;
use crate::error::{MemoryError, Result};
use crate::vector::{Metadata, SearchHit, VectorStore};

/// Retrieval-augmented memory: an embedder in front of a vector store.
///
/// Pure orchestration: `remember` is embed, insert, persist; `recall` is
/// embed, search. All state lives in the store.
#[derive(Debug)]
pub struct Memory<E> {
    embedder: E,
    store: VectorStore,
}

impl<E: Embedder> Memory<E> {
    /// Pair an embedder with a store.
    ///
    /// Fails with `DimensionMismatch` when the embedder's declared
    /// dimension differs from the store's, so a misconfiguration surfaces
    /// at construction rather than at first use.
    pub fn new(embedder: E, store: VectorStore) -> Result<Self> {
        if embedder.dimension() != store.dimension() {
            return Err(MemoryError::DimensionMismatch {
                expected: store.dimension(),
                actual: embedder.dimension(),
            });
        }
        Ok(Self { embedder, store })
    }

    /// Embed `text`, append it with `metadata`, and persist the snapshot
    /// before returning. Returns the assigned slot.
    pub fn remember(&self, text: &str, metadata: Metadata) -> Result<usize> {
        let embedding = self.embedder.embed(text)?;
        let slot = self.store.insert(embedding, metadata)?;
        self.store.persist()?;
        Ok(slot)
    }

    /// Embed `query` and return the top `k` stored records by similarity.
    pub fn recall(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let embedding = self.embedder.embed(query)?;
        self.store.search(&embedding, k)
    }

    /// The underlying store
    pub fn store(&self) -> &VectorStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashEmbedder;
    use crate::vector::StoreConfig;
    use serde_json::json;
    use tempfile::tempdir;

    fn meta(tag: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert("tag".to_string(), json!(tag));
        m
    }

    #[test]
    fn test_new_rejects_dimension_mismatch() {
        let store = VectorStore::new(StoreConfig::default().with_dimension(384));
        let err = Memory::new(HashEmbedder::new(64), store).unwrap_err();
        assert!(matches!(
            err,
            MemoryError::DimensionMismatch {
                expected: 384,
                actual: 64
            }
        ));
    }

    #[test]
    fn test_remember_is_durable() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::default().with_dimension(64).with_dir(dir.path());

        let memory = Memory::new(
            HashEmbedder::new(64),
            VectorStore::new(config.clone()),
        )
        .unwrap();
        let slot = memory.remember("the sky is blue", meta("sky")).unwrap();
        assert_eq!(slot, 0);

        // A second store opened on the same artifacts sees the record
        let reopened = VectorStore::open(config).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_recall_ranks_exact_text_first() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::default().with_dimension(64).with_dir(dir.path());

        let memory = Memory::new(HashEmbedder::new(64), VectorStore::new(config)).unwrap();
        memory.remember("alpha beta gamma", meta("first")).unwrap();
        memory.remember("delta epsilon zeta", meta("second")).unwrap();

        let hits = memory.recall("alpha beta gamma", 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].metadata["tag"], json!("first"));
        assert!((hits[0].score - 1.0).abs() < 1e-5);
        assert!(hits[1].score < hits[0].score || hits[1].slot > hits[0].slot);
    }

    #[test]
    fn test_recall_on_empty_memory() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::default().with_dimension(64).with_dir(dir.path());

        let memory = Memory::new(HashEmbedder::new(64), VectorStore::new(config)).unwrap();
        assert!(memory.recall("anything", 5).unwrap().is_empty());
    }
}
