//! JSON graph dumps for seeding a store

use serde::Deserialize;

use super::sqlite::SqliteStore;
use super::traits::StoreResult;
use crate::graph::{ObjectKey, Relation, Snapshot};

/// A whole mapping graph as one JSON document.
///
/// ```json
/// {
///   "objects": [{"type": "Audit", "id": 1}],
///   "relationships": [{"source": {"type": "Assessment", "id": 1},
///                      "destination": {"type": "Audit", "id": 1}}],
///   "snapshots": [{"id": 1, "parent": {"type": "Audit", "id": 1},
///                  "child": {"type": "Control", "id": 2}}]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphFixture {
    #[serde(default)]
    pub objects: Vec<ObjectKey>,
    #[serde(default)]
    pub relationships: Vec<Relation>,
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

impl GraphFixture {
    /// Parse a dump from JSON text; malformed input surfaces as
    /// [`StoreError::Serialization`](super::traits::StoreError::Serialization)
    pub fn from_json_str(text: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write every row into the store.
    ///
    /// Inserts exactly what the dump names; relations to snapshot stand-ins
    /// must already be spelled out as `Snapshot`-typed endpoints. Returns
    /// (objects, relationships, snapshots) counts.
    pub fn apply(&self, store: &SqliteStore) -> StoreResult<(usize, usize, usize)> {
        for object in &self.objects {
            store.save_object(object)?;
        }
        for relation in &self.relationships {
            store.save_relation(relation)?;
        }
        for snapshot in &self.snapshots {
            store.save_snapshot(snapshot)?;
        }
        Ok((
            self.objects.len(),
            self.relationships.len(),
            self.snapshots.len(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{OpenStore, RelationStore, StoreError};

    #[test]
    fn test_fixture_round_trips_into_store() {
        let text = r#"{
            "objects": [
                {"type": "Assessment", "id": 1},
                {"type": "Audit", "id": 1},
                {"type": "Control", "id": 2}
            ],
            "relationships": [
                {"source": {"type": "Assessment", "id": 1},
                 "destination": {"type": "Audit", "id": 1}},
                {"source": {"type": "Assessment", "id": 1},
                 "destination": {"type": "Snapshot", "id": 1}}
            ],
            "snapshots": [
                {"id": 1,
                 "parent": {"type": "Audit", "id": 1},
                 "child": {"type": "Control", "id": 2}}
            ]
        }"#;

        let fixture = GraphFixture::from_json_str(text).unwrap();
        let store = SqliteStore::open_in_memory().unwrap();
        let (objects, relationships, snapshots) = fixture.apply(&store).unwrap();

        assert_eq!((objects, relationships, snapshots), (3, 2, 1));
        assert!(store.object_exists(&ObjectKey::new("Assessment", 1)).unwrap());
        assert_eq!(
            store
                .relations_of(&[ObjectKey::new("Assessment", 1)])
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            store
                .snapshot_of(&ObjectKey::new("Audit", 1), &ObjectKey::new("Control", 2))
                .unwrap(),
            Some(1)
        );
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let fixture = GraphFixture::from_json_str(r#"{"objects": [{"type": "Audit", "id": 1}]}"#)
            .unwrap();
        assert_eq!(fixture.objects.len(), 1);
        assert!(fixture.relationships.is_empty());
        assert!(fixture.snapshots.is_empty());
    }

    #[test]
    fn test_malformed_fixture_is_a_serialization_error() {
        let err = GraphFixture::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));

        let err = GraphFixture::from_json_str(r#"{"objects": [{"id": 1}]}"#).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
