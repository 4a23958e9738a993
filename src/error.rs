//! Error Types
//!
//! Failure taxonomy for the store and its persistence layer.

use thiserror::Error;

/// Errors surfaced by the vector memory store.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// An input vector's length does not match the store dimension.
    /// Never padded or truncated away.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Snapshot artifacts are present but mutually inconsistent or
    /// unreadable. The store never hydrates partial state from one.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Durable-store failure, propagated as-is.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata could not be serialized while writing a snapshot.
    #[error("metadata serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
