//! Vector Memory Store
//!
//! Insertion-ordered embedding records with exact flat-index search and
//! snapshot persistence.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use super::similarity::dot_product;
use crate::error::{MemoryError, Result};
use crate::persistence::Snapshot;

/// Schema-less metadata document attached to each record. Opaque to the
/// store: stored and returned, never inspected.
pub type Metadata = serde_json::Map<String, Value>;

/// One stored entry. Embedding and metadata travel as a single record, so
/// the two can never drift out of correspondence.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Embedding dimension every record must share
    pub dimension: usize,

    /// Path of the serialized embedding collection
    pub index_path: PathBuf,

    /// Path of the serialized metadata collection
    pub metadata_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dimension: 384, // all-MiniLM-class embedders
            index_path: PathBuf::from("./data/memory.vec"),
            metadata_path: PathBuf::from("./data/memory.meta"),
        }
    }
}

impl StoreConfig {
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_index_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.index_path = path.into();
        self
    }

    pub fn with_metadata_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.metadata_path = path.into();
        self
    }

    /// Place both artifacts under `dir` with the default file names.
    pub fn with_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        let dir = dir.into();
        self.index_path = dir.join("memory.vec");
        self.metadata_path = dir.join("memory.meta");
        self
    }
}

/// A ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Insertion-order position of the matched record
    pub slot: usize,
    /// Inner product of the query against the record's embedding
    pub score: f32,
    /// The record's metadata
    pub metadata: Metadata,
}

/// Durable vector memory store with exact flat-index search.
///
/// All mutation and snapshotting serializes through one `RwLock`; searches
/// share the read side. Search is an exhaustive scan over every stored
/// record, giving exact ranking for small-to-moderate corpora. The
/// `insert`/`search` contract is the substitution boundary should an
/// approximate index ever be needed.
#[derive(Debug, Clone)]
pub struct VectorStore {
    records: Arc<RwLock<Vec<Record>>>,
    snapshot: Snapshot,
    dimension: usize,
}

impl VectorStore {
    /// Create an empty store. Nothing touches disk until `persist`.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            snapshot: Snapshot::new(config.index_path, config.metadata_path),
            dimension: config.dimension,
        }
    }

    /// Open a store hydrated from its snapshot artifacts.
    ///
    /// A missing snapshot is the normal first-run state and yields an
    /// empty store.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let store = Self::new(config);
        store.load()?;
        Ok(store)
    }

    /// Embedding dimension this store accepts
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        if actual != self.dimension {
            return Err(MemoryError::DimensionMismatch {
                expected: self.dimension,
                actual,
            });
        }
        Ok(())
    }

    /// Append a record, returning its assigned slot.
    ///
    /// The dimension check runs before any mutation and the pair lands in
    /// a single push, so a failed insert leaves the store exactly as it
    /// was.
    pub fn insert(&self, embedding: Vec<f32>, metadata: Metadata) -> Result<usize> {
        self.check_dimension(embedding.len())?;

        let mut records = self.records.write();
        records.push(Record {
            embedding,
            metadata,
        });
        Ok(records.len() - 1)
    }

    /// Rank every stored record against `query` and return the top `k`.
    ///
    /// Scores are plain inner products; stored vectors are expected to be
    /// pre-normalized by the embedder, so this behaves as cosine
    /// similarity. A `k` beyond the stored count returns everything
    /// ranked. Equal scores order by ascending slot.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.check_dimension(query.len())?;

        let records = self.records.read();

        let mut scored: Vec<(usize, f32)> = records
            .iter()
            .enumerate()
            .map(|(slot, record)| (slot, dot_product(query, &record.embedding)))
            .collect();

        // Descending score; ties resolve to the earlier slot by explicit
        // comparator, not by sort stability.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(slot, score)| SearchHit {
                slot,
                score,
                metadata: records[slot].metadata.clone(),
            })
            .collect())
    }

    /// Write the full snapshot pair.
    ///
    /// Holds the write lock for the duration so no insert interleaves
    /// with an in-progress snapshot.
    pub fn persist(&self) -> Result<()> {
        let records = self.records.write();
        self.snapshot.save(self.dimension, &records)
    }

    /// Replace in-memory contents from the snapshot pair.
    ///
    /// A missing pair yields an empty store; a half-present or mutually
    /// inconsistent pair fails with `CorruptSnapshot`, leaving current
    /// contents untouched.
    pub fn load(&self) -> Result<()> {
        let mut records = self.records.write();
        let loaded = self.snapshot.load(self.dimension)?;
        *records = loaded.unwrap_or_default();
        Ok(())
    }

    /// Clone out all records in slot order (for inspection/testing)
    pub fn records(&self) -> Vec<Record> {
        self.records.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn meta(id: u64) -> Metadata {
        let mut m = Metadata::new();
        m.insert("id".to_string(), json!(id));
        m
    }

    fn test_store(dimension: usize) -> VectorStore {
        VectorStore::new(StoreConfig::default().with_dimension(dimension))
    }

    #[test]
    fn test_insert_assigns_slots_in_order() {
        let store = test_store(3);

        assert_eq!(store.insert(vec![1.0, 0.0, 0.0], meta(1)).unwrap(), 0);
        assert_eq!(store.insert(vec![0.0, 1.0, 0.0], meta(2)).unwrap(), 1);
        assert_eq!(store.insert(vec![0.0, 0.0, 1.0], meta(3)).unwrap(), 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_insert_dimension_mismatch_leaves_store_unchanged() {
        let store = test_store(3);
        store.insert(vec![1.0, 0.0, 0.0], meta(1)).unwrap();

        let err = store.insert(vec![1.0, 0.0], meta(2)).unwrap_err();
        assert!(matches!(
            err,
            MemoryError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_search_empty_store() {
        let store = test_store(3);
        assert!(store.search(&[1.0, 0.0, 0.0], 0).unwrap().is_empty());
        assert!(store.search(&[1.0, 0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_search_dimension_mismatch() {
        let store = test_store(3);
        let err = store.search(&[1.0, 0.0], 1).unwrap_err();
        assert!(matches!(err, MemoryError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_search_ranks_by_descending_score() {
        let store = test_store(3);
        store.insert(vec![1.0, 0.0, 0.0], meta(1)).unwrap();
        store.insert(vec![0.0, 1.0, 0.0], meta(2)).unwrap();
        store.insert(vec![0.9, 0.1, 0.0], meta(3)).unwrap();

        let hits = store.search(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].metadata["id"], json!(1));
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert_eq!(hits[1].metadata["id"], json!(3));
        assert!((hits[1].score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_search_k_beyond_count_returns_all_ranked() {
        let store = test_store(3);
        store.insert(vec![0.0, 1.0, 0.0], meta(1)).unwrap();
        store.insert(vec![1.0, 0.0, 0.0], meta(2)).unwrap();

        let hits = store.search(&[1.0, 0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].slot, 1);
        assert_eq!(hits[1].slot, 0);
    }

    #[test]
    fn test_search_ties_break_to_earlier_slot() {
        let store = test_store(3);
        store.insert(vec![0.0, 0.0, 1.0], meta(1)).unwrap();
        store.insert(vec![1.0, 0.0, 0.0], meta(2)).unwrap();
        store.insert(vec![1.0, 0.0, 0.0], meta(3)).unwrap();

        let hits = store.search(&[1.0, 0.0, 0.0], 3).unwrap();
        assert_eq!(hits[0].slot, 1);
        assert_eq!(hits[1].slot, 2);
        assert_eq!(hits[2].slot, 0);
    }

    #[test]
    fn test_persist_open_roundtrip() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::default().with_dimension(3).with_dir(dir.path());

        let store = VectorStore::new(config.clone());
        store.insert(vec![1.0, 0.0, 0.0], meta(1)).unwrap();
        store.insert(vec![0.5, 0.5, 0.0], meta(2)).unwrap();
        store.persist().unwrap();

        let reopened = VectorStore::open(config).unwrap();
        assert_eq!(reopened.records(), store.records());
    }

    #[test]
    fn test_open_without_artifacts_is_empty() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::default().with_dimension(3).with_dir(dir.path());

        let store = VectorStore::open(config).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_load_keeps_current_contents() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::default().with_dimension(3).with_dir(dir.path());

        let store = VectorStore::new(config);
        store.insert(vec![1.0, 0.0, 0.0], meta(1)).unwrap();

        // Index artifact without its metadata partner
        std::fs::write(dir.path().join("memory.vec"), b"garbage").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, MemoryError::CorruptSnapshot(_)));
        assert_eq!(store.len(), 1);
    }
}
