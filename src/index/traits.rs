//! Core trait definition for similarity index implementations.
//!
//! The recommendation layer only needs exact k-NN lookups, so any index
//! (the brute-force `SimilarityIndex` today, a tree or graph index later)
//! implements `NearestNeighbors` and is used through it.

use crate::error::Result;
use crate::types::Neighbor;

/// Trait that all lookalike index implementations must satisfy.
///
/// Implementations are read-only after construction and must be safe to
/// query from many threads at once.
pub trait NearestNeighbors: Send + Sync {
    /// Return the `k` reference items closest to `query`.
    ///
    /// Results are sorted by ascending distance; equal distances are
    /// ordered by reference position, lowest first.
    ///
    /// # Errors
    /// * `DimensionMismatch` if `query.len()` differs from [`dimension`](Self::dimension).
    /// * `InsufficientData` if `k` exceeds [`len`](Self::len) and the index
    ///   rejects oversized requests.
    /// * `Validation` if `k` is zero or the query holds non-finite values.
    fn find_nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// Number of reference items in the index.
    fn len(&self) -> usize;

    /// Dimensionality shared by every reference embedding.
    fn dimension(&self) -> usize;

    /// Whether the index holds no reference items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
