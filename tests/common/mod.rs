//! Common test utilities for similarity integration tests
//!
//! Builds small relation graphs in an in-memory store and hands out
//! API instances over them.

use kinship::{
    KinshipApi, ObjectKey, OpenStore, Relation, RelationStore, Snapshot, SqliteStore, WeightTable,
    SNAPSHOT_TYPE,
};
use std::sync::Arc;

/// Builds a relation graph in an in-memory store.
pub struct GraphBuilder {
    store: Arc<SqliteStore>,
    next_snapshot_id: i64,
}

impl GraphBuilder {
    pub fn new() -> Self {
        let store = SqliteStore::open_in_memory().expect("in-memory store");
        Self {
            store: Arc::new(store),
            next_snapshot_id: 1,
        }
    }

    /// Register an object.
    pub fn object(&self, object_type: &str, id: i64) -> ObjectKey {
        let key = ObjectKey::new(object_type, id);
        self.store.save_object(&key).expect("save object");
        key
    }

    /// Relate two objects directly.
    pub fn relate(&self, source: &ObjectKey, destination: &ObjectKey) {
        self.store
            .save_relation(&Relation::new(source.clone(), destination.clone()))
            .expect("save relation");
    }

    /// Relate `source` to `children` through snapshots taken in `parent`'s
    /// scope. One snapshot exists per (parent, child) pair; repeated calls
    /// reuse it, the way audit scopes share snapshots across assessments.
    pub fn scope_map(&mut self, source: &ObjectKey, parent: &ObjectKey, children: &[&ObjectKey]) {
        for child in children {
            let snapshot_id = match self
                .store
                .snapshot_of(parent, child)
                .expect("look up snapshot")
            {
                Some(id) => id,
                None => {
                    let id = self.next_snapshot_id;
                    self.next_snapshot_id += 1;
                    self.store
                        .save_snapshot(&Snapshot::new(id, parent.clone(), (*child).clone()))
                        .expect("save snapshot");
                    id
                }
            };
            self.relate(source, &ObjectKey::new(SNAPSHOT_TYPE, snapshot_id));
        }
    }

    /// API over the built graph with the built-in weight table.
    pub fn api(&self) -> KinshipApi {
        KinshipApi::new(self.store.clone(), Arc::new(WeightTable::builtin()))
    }

    pub fn store(&self) -> Arc<SqliteStore> {
        self.store.clone()
    }
}
