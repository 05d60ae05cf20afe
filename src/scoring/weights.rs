//! Type-pair weight tables

use serde::Deserialize;
use std::collections::HashMap;

/// Weight row for one object type: what each related type contributes to
/// the aggregate, plus the qualifying threshold applied when a caller does
/// not pass one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeWeights {
    /// Aggregate weight a candidate must strictly exceed to qualify
    #[serde(default)]
    pub threshold: u64,
    /// Contribution of each related type
    #[serde(default)]
    pub weights: HashMap<String, u64>,
}

/// Static weight table keyed by object type.
///
/// Absent rows and absent related types both mean weight 0. The table is
/// built once and shared by reference; scoring never mutates it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    rows: HashMap<String, TypeWeights>,
}

impl WeightTable {
    /// The table used when no override file is given.
    ///
    /// Assessments weigh a shared audit at 5 and shared controls or
    /// objectives at 10; directive-family objects (regulations, contracts,
    /// policies, standards) count 3 each, under a qualifying threshold of 5
    /// so one shared directive never qualifies on its own. Requests weigh
    /// controls and objectives low (2) and qualify on any overlap.
    pub fn builtin() -> Self {
        fn row(threshold: u64, pairs: &[(&str, u64)]) -> TypeWeights {
            TypeWeights {
                threshold,
                weights: pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect(),
            }
        }

        let mut rows = HashMap::new();
        rows.insert(
            "Assessment".to_string(),
            row(
                5,
                &[
                    ("Audit", 5),
                    ("Control", 10),
                    ("Objective", 10),
                    ("Regulation", 3),
                    ("Contract", 3),
                    ("Policy", 3),
                    ("Standard", 3),
                ],
            ),
        );
        rows.insert(
            "Request".to_string(),
            row(
                0,
                &[
                    ("Audit", 5),
                    ("Control", 2),
                    ("Objective", 2),
                    ("Regulation", 3),
                    ("Contract", 3),
                    ("Policy", 3),
                    ("Standard", 3),
                ],
            ),
        );
        Self { rows }
    }

    pub fn from_rows(rows: HashMap<String, TypeWeights>) -> Self {
        Self { rows }
    }

    /// Parse a YAML override with the same shape as the built-in table:
    ///
    /// ```yaml
    /// Assessment:
    ///   threshold: 5
    ///   weights: { Audit: 5, Control: 10, Regulation: 3 }
    /// ```
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Contribution of a `related_type` object to an `object_type` aggregate
    pub fn weight(&self, object_type: &str, related_type: &str) -> u64 {
        self.rows
            .get(object_type)
            .and_then(|row| row.weights.get(related_type))
            .copied()
            .unwrap_or(0)
    }

    /// Threshold for `object_type` when the caller passes none
    pub fn qualifying_threshold(&self, object_type: &str) -> u64 {
        self.rows
            .get(object_type)
            .map(|row| row.threshold)
            .unwrap_or(0)
    }

    /// True if `object_type` has a row at all
    pub fn has_row(&self, object_type: &str) -> bool {
        self.rows.contains_key(object_type)
    }
}
