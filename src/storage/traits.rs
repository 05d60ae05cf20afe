//! Storage trait definitions

use crate::graph::{ObjectKey, Relation, Snapshot};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Read-side view of the mapping graph.
///
/// Implementations must be thread-safe (Send + Sync) so concurrent
/// statements can read from multiple threads. Methods are batch-shaped: one
/// call covers a whole key set, so callers never loop per candidate.
pub trait RelationStore: Send + Sync {
    /// True if the object row exists
    fn object_exists(&self, key: &ObjectKey) -> StoreResult<bool>;

    /// All ids carrying the given type tag, ascending
    fn ids_of_type(&self, object_type: &str) -> StoreResult<Vec<i64>>;

    /// Every relation with either endpoint in `keys`
    fn relations_of(&self, keys: &[ObjectKey]) -> StoreResult<Vec<Relation>>;

    /// Snapshot rows by id; unknown ids are skipped
    fn snapshots_by_id(&self, ids: &[i64]) -> StoreResult<Vec<Snapshot>>;

    /// Snapshot rows whose parent or child is in `keys`
    fn snapshots_touching(&self, keys: &[ObjectKey]) -> StoreResult<Vec<Snapshot>>;

    /// Id of the snapshot capturing `child` into `parent`'s scope, if any
    fn snapshot_of(&self, parent: &ObjectKey, child: &ObjectKey) -> StoreResult<Option<i64>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: RelationStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StoreResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StoreResult<Self>;
}
