//! Storage backends
//!
//! The scoring core reads the mapping graph through the `RelationStore`
//! trait. The primary implementation is `SqliteStore`; writes stay on the
//! concrete store because the core never performs any.

mod fixture;
mod sqlite;
mod traits;

pub use fixture::GraphFixture;
pub use sqlite::SqliteStore;
pub use traits::{OpenStore, RelationStore, StoreError, StoreResult};
