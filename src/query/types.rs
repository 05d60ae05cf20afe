//! Query batch wire types
//!
//! A batch is a JSON list of statements. Each statement names an object
//! type, the result shape it wants, sort directives, and a filter tree.
//! Filter operators arrive as `{"op": {"name": ...}}` objects; anything
//! this service does not evaluate is kept as [`Expr::Unsupported`] so
//! validation can reject it by name.

use serde::Deserialize;

/// Pseudo-column selecting similarity-weight ordering
pub const SIMILARITY_ORDER_KEY: &str = "__similarity__";

/// A full query request: statements that validate and execute together
pub type QueryBatch = Vec<Statement>;

/// Shape of a statement's result payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    /// Matching object ids
    #[default]
    Ids,
    /// Just the number of matches
    Count,
}

/// One statement in a query batch
#[derive(Debug, Clone, Deserialize)]
pub struct Statement {
    /// Object type the statement queries
    pub object_name: String,
    /// Result shape, `ids` when absent
    #[serde(rename = "type", default)]
    pub kind: ResultKind,
    /// Sort directives applied to an ids result
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    /// Filter tree, matches everything when absent
    #[serde(default)]
    pub filters: Filters,
}

/// One sort directive
#[derive(Debug, Clone, Deserialize)]
pub struct OrderBy {
    /// Column or pseudo-column to sort by
    pub name: String,
    /// Reverse the ordering when true
    #[serde(default)]
    pub desc: bool,
}

/// Filter tree for a statement
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub expression: Expr,
}

/// A filter expression
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Expr {
    /// No filter: every object of the statement's type matches
    #[default]
    Empty,
    /// Objects similar to any of the named subjects
    Similar { object_name: String, ids: Vec<i64> },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    /// An operator this service does not evaluate
    Unsupported(String),
}

impl Expr {
    /// Number of similar filters anywhere in the tree
    pub fn similar_count(&self) -> usize {
        match self {
            Expr::Similar { .. } => 1,
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.similar_count() + right.similar_count()
            }
            _ => 0,
        }
    }

    /// First unsupported operator name in the tree, if any
    pub fn first_unsupported(&self) -> Option<&str> {
        match self {
            Expr::Unsupported(name) => Some(name),
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.first_unsupported().or_else(|| right.first_unsupported())
            }
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        expr_from_value(&value).map_err(serde::de::Error::custom)
    }
}

fn expr_from_value(value: &serde_json::Value) -> Result<Expr, String> {
    let Some(map) = value.as_object() else {
        return Err("filter expression must be an object".to_string());
    };
    let Some(op) = map.get("op") else {
        return Ok(Expr::Empty);
    };
    let name = op
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| "filter op requires a name".to_string())?;

    match name {
        "similar" => {
            let object_name = map
                .get("object_name")
                .and_then(|n| n.as_str())
                .ok_or_else(|| "similar filter requires an object_name".to_string())?
                .to_string();
            let ids = map
                .get("ids")
                .and_then(|v| v.as_array())
                .ok_or_else(|| "similar filter requires a list of ids".to_string())?
                .iter()
                .map(id_from_value)
                .collect::<Result<Vec<i64>, String>>()?;
            Ok(Expr::Similar { object_name, ids })
        }
        "AND" | "OR" => {
            let left = map
                .get("left")
                .ok_or_else(|| format!("{name} filter requires a left operand"))?;
            let right = map
                .get("right")
                .ok_or_else(|| format!("{name} filter requires a right operand"))?;
            let left = Box::new(expr_from_value(left)?);
            let right = Box::new(expr_from_value(right)?);
            Ok(if name == "AND" {
                Expr::And(left, right)
            } else {
                Expr::Or(left, right)
            })
        }
        other => Ok(Expr::Unsupported(other.to_string())),
    }
}

/// Ids arrive as JSON numbers or as numeric strings
fn id_from_value(value: &serde_json::Value) -> Result<i64, String> {
    match value {
        serde_json::Value::Number(n) => {
            n.as_i64().ok_or_else(|| format!("id out of range: {n}"))
        }
        serde_json::Value::String(s) => s
            .parse::<i64>()
            .map_err(|_| format!("id is not an integer: {s:?}")),
        other => Err(format!("id must be an integer or numeric string: {other}")),
    }
}

/// Parse a JSON query batch
pub fn parse_batch(text: &str) -> serde_json::Result<QueryBatch> {
    serde_json::from_str(text)
}
