//! Batch validation
//!
//! Every statement is checked before any statement runs; one bad
//! statement rejects the whole batch. Similarity ordering is only valid
//! when the same statement carries exactly one similar filter, because
//! the weights it sorts by exist only within that statement.

use crate::query::execute::QueryError;
use crate::query::types::{Statement, SIMILARITY_ORDER_KEY};

/// Plain columns an ids result may be ordered by
pub const PLAIN_ORDER_KEYS: &[&str] = &["id"];

pub fn validate_batch(batch: &[Statement]) -> Result<(), QueryError> {
    for (index, statement) in batch.iter().enumerate() {
        validate_statement(index, statement)?;
    }
    Ok(())
}

fn validate_statement(index: usize, statement: &Statement) -> Result<(), QueryError> {
    if let Some(op) = statement.filters.expression.first_unsupported() {
        return Err(QueryError::UnsupportedOperator {
            statement: index,
            op: op.to_string(),
        });
    }

    let similar_count = statement.filters.expression.similar_count();
    if similar_count > 1 {
        return Err(QueryError::MultipleSimilarFilters {
            statement: index,
            count: similar_count,
        });
    }

    for order in &statement.order_by {
        if order.name == SIMILARITY_ORDER_KEY {
            if similar_count != 1 {
                return Err(QueryError::OrderWithoutSimilarFilter { statement: index });
            }
        } else if !PLAIN_ORDER_KEYS.contains(&order.name.as_str()) {
            return Err(QueryError::UnknownOrderKey {
                statement: index,
                key: order.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::types::{Expr, Filters, OrderBy, ResultKind};

    fn statement(expression: Expr, order_by: Vec<OrderBy>) -> Statement {
        Statement {
            object_name: "Assessment".to_string(),
            kind: ResultKind::Ids,
            order_by,
            filters: Filters { expression },
        }
    }

    fn similar(ids: Vec<i64>) -> Expr {
        Expr::Similar {
            object_name: "Assessment".to_string(),
            ids,
        }
    }

    fn similarity_order() -> Vec<OrderBy> {
        vec![OrderBy {
            name: SIMILARITY_ORDER_KEY.to_string(),
            desc: false,
        }]
    }

    #[test]
    fn test_empty_batch_is_valid() {
        assert!(validate_batch(&[]).is_ok());
    }

    #[test]
    fn test_similarity_order_with_similar_filter() {
        let batch = [statement(similar(vec![1]), similarity_order())];
        assert!(validate_batch(&batch).is_ok());
    }

    #[test]
    fn test_similarity_order_without_filter_rejected() {
        let batch = [statement(Expr::Empty, similarity_order())];
        let err = validate_batch(&batch).unwrap_err();
        assert!(matches!(
            err,
            QueryError::OrderWithoutSimilarFilter { statement: 0 }
        ));
    }

    #[test]
    fn test_filter_in_other_statement_does_not_help() {
        // The similar filter lives in statement 0, the ordering in 1
        let batch = [
            statement(similar(vec![1]), Vec::new()),
            statement(Expr::Empty, similarity_order()),
        ];
        let err = validate_batch(&batch).unwrap_err();
        assert!(matches!(
            err,
            QueryError::OrderWithoutSimilarFilter { statement: 1 }
        ));
    }

    #[test]
    fn test_two_similar_filters_rejected() {
        let expression = Expr::And(Box::new(similar(vec![1])), Box::new(similar(vec![2])));
        let batch = [statement(expression, similarity_order())];
        let err = validate_batch(&batch).unwrap_err();
        assert!(matches!(
            err,
            QueryError::MultipleSimilarFilters {
                statement: 0,
                count: 2
            }
        ));
    }

    #[test]
    fn test_unsupported_operator_rejected() {
        let batch = [statement(
            Expr::Unsupported("text_search".to_string()),
            Vec::new(),
        )];
        let err = validate_batch(&batch).unwrap_err();
        match err {
            QueryError::UnsupportedOperator { statement: 0, op } => {
                assert_eq!(op, "text_search");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_order_key_rejected() {
        let batch = [statement(
            Expr::Empty,
            vec![OrderBy {
                name: "title".to_string(),
                desc: false,
            }],
        )];
        let err = validate_batch(&batch).unwrap_err();
        assert!(matches!(err, QueryError::UnknownOrderKey { statement: 0, key } if key == "title"));
    }

    #[test]
    fn test_plain_id_order_is_valid() {
        let batch = [statement(
            Expr::Empty,
            vec![OrderBy {
                name: "id".to_string(),
                desc: true,
            }],
        )];
        assert!(validate_batch(&batch).is_ok());
    }
}
