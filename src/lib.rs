//! Kinship: similarity scoring over an object relation graph
//!
//! Objects are similar when they share related objects: a shared audit,
//! control, or directive contributes a configured weight, and candidates
//! qualify by strictly exceeding a threshold. Relationships recorded
//! against snapshots count for the objects those snapshots capture.
//!
//! # Core Concepts
//!
//! - **Objects**: typed, numbered entities (`Assessment 1`, `Control 7`)
//! - **Relations**: undirected links between objects
//! - **Snapshots**: frozen copies of an object within a parent's scope;
//!   relating to a snapshot relates to both parent and child
//!
//! # Example
//!
//! ```
//! use kinship::WeightTable;
//!
//! let weights = WeightTable::builtin();
//! assert_eq!(weights.weight("Assessment", "Control"), 10);
//! assert_eq!(weights.weight("Assessment", "Widget"), 0);
//! ```

mod api;
mod graph;
pub mod query;
pub mod scoring;
pub mod storage;

pub use api::KinshipApi;
pub use graph::{ObjectKey, Relation, Snapshot, SNAPSHOT_TYPE};
pub use query::{
    parse_batch, QueryBatch, QueryError, QueryService, ResultPayload, Statement,
    StatementResult, SIMILARITY_ORDER_KEY,
};
pub use scoring::{ScoreError, SimilarityCandidate, SimilarityScorer, WeightTable};
pub use storage::{GraphFixture, OpenStore, RelationStore, SqliteStore, StoreError, StoreResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
