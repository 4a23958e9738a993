//! Persistence Module
//!
//! Snapshot artifacts backing the vector memory store.

mod snapshot;

pub use snapshot::Snapshot;
