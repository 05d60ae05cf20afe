//! Directed mappings between objects

use serde::{Deserialize, Serialize};

use super::object::ObjectKey;

/// A directed mapping between two objects.
///
/// The direction is a storage detail only: similarity treats an edge from A
/// to B exactly like an edge from B to A.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub source: ObjectKey,
    pub destination: ObjectKey,
}

impl Relation {
    pub fn new(source: ObjectKey, destination: ObjectKey) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// The endpoint opposite `key`, if `key` is one of the two ends.
    ///
    /// A self-loop returns the same key back.
    pub fn other_end(&self, key: &ObjectKey) -> Option<&ObjectKey> {
        if &self.source == key {
            Some(&self.destination)
        } else if &self.destination == key {
            Some(&self.source)
        } else {
            None
        }
    }

    /// True if either endpoint equals `key`
    pub fn touches(&self, key: &ObjectKey) -> bool {
        &self.source == key || &self.destination == key
    }
}
