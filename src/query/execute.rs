//! Batch execution
//!
//! A validated batch runs one blocking task per statement; results come
//! back in statement order regardless of completion order. Similar
//! filters with several subject ids union their candidates, keeping each
//! candidate's highest weight.

use serde::ser::SerializeMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::graph::ObjectKey;
use crate::query::types::{
    Expr, OrderBy, QueryBatch, ResultKind, Statement, SIMILARITY_ORDER_KEY,
};
use crate::query::validate::validate_batch;
use crate::scoring::{ScoreError, SimilarityScorer, WeightTable};
use crate::storage::{RelationStore, StoreError};

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("statement {statement}: unsupported filter operator {op:?}")]
    UnsupportedOperator { statement: usize, op: String },

    #[error("statement {statement}: {count} similar filters, at most one is allowed")]
    MultipleSimilarFilters { statement: usize, count: usize },

    #[error(
        "statement {statement}: ordering by {key:?} requires a similar filter in the same statement",
        key = SIMILARITY_ORDER_KEY
    )]
    OrderWithoutSimilarFilter { statement: usize },

    #[error("statement {statement}: unknown order key {key:?}")]
    UnknownOrderKey { statement: usize, key: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("statement task failed: {0}")]
    Join(String),
}

impl QueryError {
    /// True when the request itself is at fault rather than the service
    pub fn is_client_error(&self) -> bool {
        !matches!(self, QueryError::Store(_) | QueryError::Join(_))
    }
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Payload of one executed statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultPayload {
    Ids { ids: Vec<i64> },
    Count { count: usize },
}

/// One executed statement, keyed by its object name on the wire:
/// `{"Assessment": {"ids": [3, 5]}}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementResult {
    pub object_name: String,
    pub payload: ResultPayload,
}

impl Serialize for StatementResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.object_name, &self.payload)?;
        map.end()
    }
}

/// Validates and executes query batches against a shared store.
pub struct QueryService {
    store: Arc<dyn RelationStore>,
    weights: Arc<WeightTable>,
}

impl QueryService {
    pub fn new(store: Arc<dyn RelationStore>, weights: Arc<WeightTable>) -> Self {
        Self { store, weights }
    }

    /// Execute a whole batch. Validation failures reject the batch before
    /// any statement runs.
    pub async fn execute(&self, batch: QueryBatch) -> QueryResult<Vec<StatementResult>> {
        validate_batch(&batch)?;
        info!(statements = batch.len(), "executing query batch");

        let count = batch.len();
        let mut tasks = JoinSet::new();
        for (index, statement) in batch.into_iter().enumerate() {
            let store = self.store.clone();
            let weights = self.weights.clone();
            tasks.spawn_blocking(move || {
                (index, execute_statement(index, &statement, store, weights))
            });
        }

        let mut results: Vec<Option<StatementResult>> = Vec::new();
        results.resize_with(count, || None);
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined.map_err(|e| QueryError::Join(e.to_string()))?;
            results[index] = Some(result?);
        }
        Ok(results.into_iter().flatten().collect())
    }
}

/// Matched ids with the similarity weight, for ids a similar filter produced
type Matches = HashMap<i64, Option<u64>>;

fn execute_statement(
    index: usize,
    statement: &Statement,
    store: Arc<dyn RelationStore>,
    weights: Arc<WeightTable>,
) -> QueryResult<StatementResult> {
    let matches = evaluate(
        index,
        &statement.filters.expression,
        &statement.object_name,
        &store,
        &weights,
    )?;

    let payload = match statement.kind {
        ResultKind::Count => ResultPayload::Count {
            count: matches.len(),
        },
        ResultKind::Ids => ResultPayload::Ids {
            ids: order_ids(matches, &statement.order_by),
        },
    };
    Ok(StatementResult {
        object_name: statement.object_name.clone(),
        payload,
    })
}

fn evaluate(
    index: usize,
    expr: &Expr,
    object_name: &str,
    store: &Arc<dyn RelationStore>,
    weights: &Arc<WeightTable>,
) -> QueryResult<Matches> {
    match expr {
        Expr::Empty => {
            let ids = store.ids_of_type(object_name)?;
            Ok(ids.into_iter().map(|id| (id, None)).collect())
        }
        Expr::Similar {
            object_name: subject_type,
            ids,
        } => evaluate_similar(subject_type, ids, object_name, store, weights),
        Expr::And(left, right) => {
            let left = evaluate(index, left, object_name, store, weights)?;
            let right = evaluate(index, right, object_name, store, weights)?;
            Ok(intersect(left, right))
        }
        Expr::Or(left, right) => {
            let left = evaluate(index, left, object_name, store, weights)?;
            let right = evaluate(index, right, object_name, store, weights)?;
            Ok(union(left, right))
        }
        // Validation rejects these before execution
        Expr::Unsupported(op) => Err(QueryError::UnsupportedOperator {
            statement: index,
            op: op.clone(),
        }),
    }
}

/// Matches for one similar filter: objects of `candidate_type` similar to
/// any of the subjects, keeping each candidate's highest weight.
fn evaluate_similar(
    subject_type: &str,
    subject_ids: &[i64],
    candidate_type: &str,
    store: &Arc<dyn RelationStore>,
    weights: &Arc<WeightTable>,
) -> QueryResult<Matches> {
    let scorer = SimilarityScorer::new(store.clone(), weights.clone());
    let candidate_types = vec![candidate_type.to_string()];

    let mut matches = Matches::new();
    for id in subject_ids {
        let subject = ObjectKey::new(subject_type, *id);
        let candidates = match scorer.score(&subject, &candidate_types, None) {
            Ok(candidates) => candidates,
            Err(ScoreError::SubjectNotFound(key)) => {
                // Unknown subjects contribute nothing rather than failing
                // the statement
                warn!(subject = %key, "similar filter subject not found");
                continue;
            }
            Err(ScoreError::Store(e)) => return Err(e.into()),
        };
        for candidate in candidates {
            let slot = matches.entry(candidate.id).or_insert(None);
            *slot = Some(slot.map_or(candidate.weight, |w| w.max(candidate.weight)));
        }
    }
    Ok(matches)
}

/// Keep ids present on both sides, with the higher weight
fn intersect(mut left: Matches, right: Matches) -> Matches {
    left.retain(|id, _| right.contains_key(id));
    for (id, weight) in right {
        if let Some(slot) = left.get_mut(&id) {
            *slot = merge_weights(*slot, weight);
        }
    }
    left
}

/// Keep ids from either side, with the higher weight
fn union(mut left: Matches, right: Matches) -> Matches {
    for (id, weight) in right {
        let slot = left.entry(id).or_insert(None);
        *slot = merge_weights(*slot, weight);
    }
    left
}

fn merge_weights(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Sort matched ids per the statement's first order directive.
///
/// Similarity ordering sorts by ascending weight with ascending id breaking
/// ties; ids without a weight sort as zero. `desc` reverses the whole
/// ordering. Without directives, ids come back ascending.
fn order_ids(matches: Matches, order_by: &[OrderBy]) -> Vec<i64> {
    let Some(order) = order_by.first() else {
        let mut ids: Vec<i64> = matches.into_keys().collect();
        ids.sort_unstable();
        return ids;
    };

    let mut entries: Vec<(i64, Option<u64>)> = matches.into_iter().collect();
    if order.name == SIMILARITY_ORDER_KEY {
        entries.sort_by_key(|(id, weight)| (weight.unwrap_or(0), *id));
    } else {
        entries.sort_by_key(|(id, _)| *id);
    }
    if order.desc {
        entries.reverse();
    }
    entries.into_iter().map(|(id, _)| id).collect()
}
