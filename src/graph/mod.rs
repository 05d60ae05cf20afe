//! Core graph data structures

mod object;
mod relation;
mod snapshot;

#[cfg(test)]
mod tests;

pub use object::ObjectKey;
pub use relation::Relation;
pub use snapshot::{Snapshot, SNAPSHOT_TYPE};
