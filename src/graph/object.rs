//! Object identity in the mapping graph

use serde::{Deserialize, Serialize};

/// Identity of a business object: a type tag plus an integer id.
///
/// Scoring never looks at object attributes. Two keys name the same object
/// exactly when both fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    /// Type tag (e.g., "Assessment", "Control")
    #[serde(rename = "type")]
    pub object_type: String,
    /// Numeric identifier within the type
    pub id: i64,
}

impl ObjectKey {
    /// Create a key from a type tag and id
    pub fn new(object_type: impl Into<String>, id: i64) -> Self {
        Self {
            object_type: object_type.into(),
            id,
        }
    }

    /// True if this key carries the given type tag
    pub fn is_type(&self, object_type: &str) -> bool {
        self.object_type == object_type
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.object_type, self.id)
    }
}
