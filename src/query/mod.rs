//! Query batches: parsing, validation, and execution
//!
//! A batch is a list of statements that validate together and execute
//! concurrently. Statements can filter by similarity and order results
//! by the weights that filter produced.

mod execute;
mod types;
mod validate;

pub use execute::{QueryError, QueryResult, QueryService, ResultPayload, StatementResult};
pub use types::{
    parse_batch, Expr, Filters, OrderBy, QueryBatch, ResultKind, Statement, SIMILARITY_ORDER_KEY,
};
pub use validate::{validate_batch, PLAIN_ORDER_KEYS};
