//! Index module for lookalike similarity search.
//!
//! Provides the `NearestNeighbors` trait, distance helpers, and the exact
//! brute-force `SimilarityIndex`.

pub mod distance;
pub mod flat;
pub mod traits;

// Re-export the core trait and the flat index at the module level so callers
// can write `use crate::index::{NearestNeighbors, SimilarityIndex}`.
pub use flat::{IndexOptions, SimilarityIndex, DEFAULT_PARALLEL_THRESHOLD};
pub use traits::NearestNeighbors;
