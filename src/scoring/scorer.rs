//! Similarity scoring
//!
//! Two objects are similar when they share related objects. Each shared
//! object contributes a weight drawn from the candidate's row in the
//! weight table, and a candidate qualifies when its aggregate strictly
//! exceeds the threshold.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::graph::ObjectKey;
use crate::scoring::{RelationReader, WeightTable};
use crate::storage::{RelationStore, StoreError};

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("subject not found: {0}")]
    SubjectNotFound(ObjectKey),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type ScoreResult<T> = Result<T, ScoreError>;

/// One qualifying candidate with its aggregate weight
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarityCandidate {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: i64,
    pub weight: u64,
}

/// Scores candidates of the requested types against a subject.
pub struct SimilarityScorer {
    reader: RelationReader,
    weights: Arc<WeightTable>,
}

impl SimilarityScorer {
    pub fn new(store: Arc<dyn RelationStore>, weights: Arc<WeightTable>) -> Self {
        Self {
            reader: RelationReader::new(store),
            weights,
        }
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Candidates of `candidate_types` whose aggregate weight strictly
    /// exceeds `threshold`, sorted by ascending weight then ascending id.
    ///
    /// When `threshold` is `None` the subject type's qualifying threshold
    /// applies. The subject itself never appears in the result.
    pub fn score(
        &self,
        subject: &ObjectKey,
        candidate_types: &[String],
        threshold: Option<u64>,
    ) -> ScoreResult<Vec<SimilarityCandidate>> {
        let threshold = threshold
            .unwrap_or_else(|| self.weights.qualifying_threshold(&subject.object_type));

        let related = self
            .reader
            .expand(subject)?
            .ok_or_else(|| ScoreError::SubjectNotFound(subject.clone()))?;

        // Drop targets weighing zero for the subject's type; they cannot
        // contribute to any candidate through this subject.
        let targets: HashSet<ObjectKey> = related
            .into_iter()
            .filter(|target| self.weights.weight(&subject.object_type, &target.object_type) > 0)
            .collect();

        let types: HashSet<String> = candidate_types.iter().cloned().collect();
        let shared = self.reader.related_to_targets(&targets, &types)?;

        let mut candidates: Vec<SimilarityCandidate> = shared
            .into_iter()
            .filter(|(candidate, _)| candidate != subject)
            .filter_map(|(candidate, shared_targets)| {
                let weight: u64 = shared_targets
                    .iter()
                    .map(|target| self.weights.weight(&candidate.object_type, &target.object_type))
                    .sum();
                (weight > threshold).then(|| SimilarityCandidate {
                    object_type: candidate.object_type,
                    id: candidate.id,
                    weight,
                })
            })
            .collect();
        candidates.sort_by(|a, b| a.weight.cmp(&b.weight).then(a.id.cmp(&b.id)));

        debug!(
            subject = %subject,
            threshold,
            candidates = candidates.len(),
            "scored similarity"
        );
        Ok(candidates)
    }
}
