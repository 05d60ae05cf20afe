//! Similarity scoring over the relation graph

mod reader;
mod scorer;
mod weights;

pub use reader::RelationReader;
pub use scorer::{ScoreError, ScoreResult, SimilarityCandidate, SimilarityScorer};
pub use weights::{TypeWeights, WeightTable};
