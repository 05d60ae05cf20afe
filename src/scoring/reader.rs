//! Snapshot-aware relation traversal
//!
//! The store records some relationships against snapshots rather than the
//! objects they capture. The reader hides that indirection: a relation to a
//! snapshot counts as a relation to both the snapshot's parent and its
//! child, in both traversal directions.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use crate::graph::{ObjectKey, SNAPSHOT_TYPE};
use crate::storage::{RelationStore, StoreResult};

/// Reads related objects out of a [`RelationStore`], resolving snapshot
/// endpoints to the objects they capture.
pub struct RelationReader {
    store: Arc<dyn RelationStore>,
}

impl RelationReader {
    pub fn new(store: Arc<dyn RelationStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RelationStore> {
        &self.store
    }

    /// Every object related to `subject`, with snapshot endpoints resolved
    /// to their parent and child. The subject itself is never returned.
    pub fn expand(&self, subject: &ObjectKey) -> StoreResult<Option<HashSet<ObjectKey>>> {
        if !self.store.object_exists(subject)? {
            return Ok(None);
        }

        let relations = self.store.relations_of(std::slice::from_ref(subject))?;

        let mut related = HashSet::new();
        let mut snapshot_ids = Vec::new();
        for relation in &relations {
            let Some(other) = relation.other_end(subject) else {
                continue;
            };
            if other.is_type(SNAPSHOT_TYPE) {
                snapshot_ids.push(other.id);
            } else {
                related.insert(other.clone());
            }
        }

        for snapshot in self.store.snapshots_by_id(&snapshot_ids)? {
            related.insert(snapshot.parent.clone());
            related.insert(snapshot.child.clone());
        }
        related.remove(subject);

        debug!(
            subject = %subject,
            related = related.len(),
            snapshots = snapshot_ids.len(),
            "expanded relations"
        );
        Ok(Some(related))
    }

    /// Objects related to at least one of `targets`, keyed by the related
    /// object, with the set of targets each one shares. Only objects whose
    /// type appears in `candidate_types` are kept.
    ///
    /// Snapshot indirection runs in reverse here: a target captured by a
    /// snapshot is shared with everything related to that snapshot.
    pub fn related_to_targets(
        &self,
        targets: &HashSet<ObjectKey>,
        candidate_types: &HashSet<String>,
    ) -> StoreResult<HashMap<ObjectKey, HashSet<ObjectKey>>> {
        let mut shared: HashMap<ObjectKey, HashSet<ObjectKey>> = HashMap::new();
        if targets.is_empty() {
            return Ok(shared);
        }

        let target_list: Vec<ObjectKey> = targets.iter().cloned().collect();

        // Direct relations to the targets
        for relation in self.store.relations_of(&target_list)? {
            for endpoint in [&relation.source, &relation.destination] {
                if let Some(target) = targets.get(endpoint) {
                    if let Some(other) = relation.other_end(target) {
                        record(&mut shared, candidate_types, other, target);
                    }
                }
            }
        }

        // Relations to snapshots capturing the targets
        let snapshots = self.store.snapshots_touching(&target_list)?;
        let mut by_key: HashMap<ObjectKey, Vec<ObjectKey>> = HashMap::new();
        for snapshot in &snapshots {
            let mut matched = Vec::new();
            if targets.contains(&snapshot.parent) {
                matched.push(snapshot.parent.clone());
            }
            if targets.contains(&snapshot.child) {
                matched.push(snapshot.child.clone());
            }
            if !matched.is_empty() {
                by_key.insert(snapshot.key(), matched);
            }
        }

        let snapshot_keys: Vec<ObjectKey> = by_key.keys().cloned().collect();
        for relation in self.store.relations_of(&snapshot_keys)? {
            for endpoint in [&relation.source, &relation.destination] {
                if let Some(matched) = by_key.get(endpoint) {
                    if let Some(other) = relation.other_end(endpoint) {
                        for target in matched {
                            record(&mut shared, candidate_types, other, target);
                        }
                    }
                }
            }
        }

        Ok(shared)
    }
}

fn record(
    shared: &mut HashMap<ObjectKey, HashSet<ObjectKey>>,
    candidate_types: &HashSet<String>,
    candidate: &ObjectKey,
    target: &ObjectKey,
) {
    if candidate_types.contains(&candidate.object_type) {
        shared
            .entry(candidate.clone())
            .or_default()
            .insert(target.clone());
    }
}
