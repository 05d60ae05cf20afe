//! Transport-independent API layer.
//!
//! `KinshipApi` is the single entry point for consumer-facing operations.
//! Transports (the CLI, direct embedding) call `KinshipApi` methods rather
//! than reaching into the scorer or query service directly.

use std::sync::Arc;

use crate::graph::ObjectKey;
use crate::query::{QueryBatch, QueryResult, QueryService, StatementResult};
use crate::scoring::{ScoreResult, SimilarityCandidate, SimilarityScorer, WeightTable};
use crate::storage::RelationStore;

/// Single entry point for consumer-facing operations.
#[derive(Clone)]
pub struct KinshipApi {
    scorer: Arc<SimilarityScorer>,
    service: Arc<QueryService>,
}

impl KinshipApi {
    /// Create a new API instance over a shared store and weight table.
    pub fn new(store: Arc<dyn RelationStore>, weights: Arc<WeightTable>) -> Self {
        Self {
            scorer: Arc::new(SimilarityScorer::new(store.clone(), weights.clone())),
            service: Arc::new(QueryService::new(store, weights)),
        }
    }

    /// Objects of the requested types similar to `subject`, ordered by
    /// ascending weight.
    pub fn similar(
        &self,
        subject: &ObjectKey,
        candidate_types: &[String],
        threshold: Option<u64>,
    ) -> ScoreResult<Vec<SimilarityCandidate>> {
        self.scorer.score(subject, candidate_types, threshold)
    }

    /// Validate and execute a query batch.
    pub async fn query(&self, batch: QueryBatch) -> QueryResult<Vec<StatementResult>> {
        self.service.execute(batch).await
    }
}
