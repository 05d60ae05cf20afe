//! Serialization tests with wire-compatible fixtures

use serde_json::{json, Value};

/// Wire fixture: a relation as the importer receives it
fn relation_fixture() -> Value {
    json!({
        "source": {"type": "Assessment", "id": 1},
        "destination": {"type": "Control", "id": 7}
    })
}

/// Wire fixture: a snapshot row as the importer receives it
fn snapshot_fixture() -> Value {
    json!({
        "id": 12,
        "parent": {"type": "Audit", "id": 3},
        "child": {"type": "Regulation", "id": 9},
        "captured_at": "2016-04-21T10:00:00Z"
    })
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::graph::{ObjectKey, Relation, Snapshot, SNAPSHOT_TYPE};

    #[test]
    fn object_key_type_field_renamed() {
        let key = ObjectKey::new("Assessment", 42);
        let json = serde_json::to_value(&key).unwrap();

        // Wire uses "type", not "object_type"
        assert!(json.get("type").is_some());
        assert!(json.get("object_type").is_none());
        assert_eq!(json["type"], "Assessment");
        assert_eq!(json["id"], 42);
    }

    #[test]
    fn object_key_deserializes_from_wire_shape() {
        let key: ObjectKey = serde_json::from_value(json!({"type": "Audit", "id": 3})).unwrap();
        assert_eq!(key, ObjectKey::new("Audit", 3));
    }

    #[test]
    fn object_key_display_is_type_then_id() {
        let key = ObjectKey::new("Regulation", 9);
        assert_eq!(key.to_string(), "Regulation 9");
    }

    #[test]
    fn relation_deserializes_from_wire_shape() {
        let relation: Relation = serde_json::from_value(relation_fixture()).unwrap();
        assert_eq!(relation.source, ObjectKey::new("Assessment", 1));
        assert_eq!(relation.destination, ObjectKey::new("Control", 7));
    }

    #[test]
    fn relation_other_end_works_both_ways() {
        let a = ObjectKey::new("Assessment", 1);
        let b = ObjectKey::new("Control", 7);
        let relation = Relation::new(a.clone(), b.clone());

        assert_eq!(relation.other_end(&a), Some(&b));
        assert_eq!(relation.other_end(&b), Some(&a));
        assert_eq!(relation.other_end(&ObjectKey::new("Audit", 1)), None);
        assert!(relation.touches(&a));
        assert!(relation.touches(&b));
    }

    #[test]
    fn snapshot_deserializes_from_wire_shape() {
        let snapshot: Snapshot = serde_json::from_value(snapshot_fixture()).unwrap();
        assert_eq!(snapshot.id, 12);
        assert_eq!(snapshot.parent, ObjectKey::new("Audit", 3));
        assert_eq!(snapshot.child, ObjectKey::new("Regulation", 9));
        assert_eq!(snapshot.captured_at.to_rfc3339(), "2016-04-21T10:00:00+00:00");
    }

    #[test]
    fn snapshot_captured_at_defaults_when_absent() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "id": 1,
            "parent": {"type": "Audit", "id": 1},
            "child": {"type": "Control", "id": 2}
        }))
        .unwrap();
        assert_eq!(snapshot.id, 1);
    }

    #[test]
    fn snapshot_key_uses_reserved_type_tag() {
        let snapshot: Snapshot = serde_json::from_value(snapshot_fixture()).unwrap();
        assert_eq!(snapshot.key(), ObjectKey::new(SNAPSHOT_TYPE, 12));
    }
}
