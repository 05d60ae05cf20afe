//! Snapshot stand-ins for scope-captured objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::object::ObjectKey;

/// Reserved type tag snapshots use when they appear as relation endpoints.
pub const SNAPSHOT_TYPE: &str = "Snapshot";

/// A frozen copy of `child` captured into the scope of `parent`.
///
/// Snapshots appear in the relationship table as ordinary endpoints typed
/// `Snapshot`. Readers resolve such endpoints back to the (parent, child)
/// pair; both count as related. At most one snapshot exists per
/// (parent, child) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: i64,
    /// Scope object (e.g., an Audit)
    pub parent: ObjectKey,
    /// The object whose state was captured
    pub child: ObjectKey,
    /// When the copy was taken
    #[serde(default = "Utc::now")]
    pub captured_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(id: i64, parent: ObjectKey, child: ObjectKey) -> Self {
        Self {
            id,
            parent,
            child,
            captured_at: Utc::now(),
        }
    }

    /// The key this snapshot participates in relations under
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(SNAPSHOT_TYPE, self.id)
    }
}
