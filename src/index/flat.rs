//! Exact brute-force similarity index.
//!
//! Reference embeddings are stored row-major in one contiguous buffer. A
//! query is compared against every row; a bounded max-heap keeps the `k`
//! best candidates under the (distance, position) ordering, so ties always
//! resolve to the lower reference position. Large reference sets are split
//! into row ranges scanned on the rayon pool; each range produces its own
//! top-k under the same ordering and the union is re-ranked, which yields
//! exactly the sequential result.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{LookalikeError, Result};
use crate::types::{Embedding, ImageId, KPolicy, Neighbor};

use super::distance::euclidean_distance;
use super::traits::NearestNeighbors;

/// Reference sets at least this large are scanned in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 16_384;

/// Minimum number of rows handed to one rayon task.
const MIN_ROWS_PER_TASK: usize = 1_024;

/// Construction-time knobs for a [`SimilarityIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    pub k_policy: KPolicy,
    pub parallel_threshold: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            k_policy: KPolicy::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Immutable, exact k-NN index over a fixed reference set.
pub struct SimilarityIndex {
    dim: usize,
    /// Row-major `len * dim` buffer.
    vectors: Vec<f32>,
    ids: Vec<ImageId>,
    options: IndexOptions,
}

impl std::fmt::Debug for SimilarityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityIndex")
            .field("len", &self.ids.len())
            .field("dim", &self.dim)
            .field("options", &self.options)
            .finish()
    }
}

/// A scored candidate. Ordered by distance, then by position.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    distance: f32,
    position: usize,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.position.cmp(&other.position))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl SimilarityIndex {
    /// Build an index with default options (reject oversized `k`).
    pub fn build(embeddings: Vec<Embedding>, identifiers: Vec<ImageId>) -> Result<Self> {
        Self::build_with_options(embeddings, identifiers, IndexOptions::default())
    }

    /// Build an index from aligned embedding and identifier columns.
    ///
    /// # Errors
    /// Returns `InvalidReferenceSet` if the columns differ in length, the set
    /// is empty, the dimensionality is zero or inconsistent, or any component
    /// is NaN or infinite.
    pub fn build_with_options(
        embeddings: Vec<Embedding>,
        identifiers: Vec<ImageId>,
        options: IndexOptions,
    ) -> Result<Self> {
        if embeddings.len() != identifiers.len() {
            return Err(invalid(format!(
                "{} embeddings but {} identifiers",
                embeddings.len(),
                identifiers.len()
            )));
        }
        let dim = match embeddings.first() {
            Some(first) => first.len(),
            None => return Err(invalid("reference set is empty".to_string())),
        };
        if dim == 0 {
            return Err(invalid("embeddings have zero dimensions".to_string()));
        }

        let mut vectors = Vec::with_capacity(embeddings.len() * dim);
        for (position, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != dim {
                return Err(invalid(format!(
                    "embedding at position {position} has {} dimensions, expected {dim}",
                    embedding.len()
                )));
            }
            if embedding.iter().any(|x| !x.is_finite()) {
                return Err(invalid(format!(
                    "embedding at position {position} contains a non-finite value"
                )));
            }
            vectors.extend_from_slice(embedding);
        }

        Ok(Self {
            dim,
            vectors,
            ids: identifiers,
            options,
        })
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    pub fn k_policy(&self) -> KPolicy {
        self.options.k_policy
    }

    /// Exact k-NN lookup. See [`NearestNeighbors::find_nearest`].
    pub fn find_nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dim {
            return Err(LookalikeError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Err(LookalikeError::Validation("k must be > 0".into()));
        }
        if query.iter().any(|x| !x.is_finite()) {
            return Err(LookalikeError::Validation(
                "query contains a non-finite value".into(),
            ));
        }
        let k = self.resolve_k(k)?;

        let parallel = self.ids.len() >= self.options.parallel_threshold;
        let mut ranked = if parallel {
            self.scan_parallel(query, k)
        } else {
            scan_rows(&self.vectors, self.dim, 0, query, k)
        };
        ranked.sort_unstable();
        ranked.truncate(k);

        debug!(
            k,
            scanned = self.ids.len(),
            parallel,
            "nearest neighbor scan complete"
        );

        Ok(ranked
            .into_iter()
            .map(|r| Neighbor {
                id: self.ids[r.position].clone(),
                position: r.position,
                distance: r.distance,
            })
            .collect())
    }

    fn resolve_k(&self, k: usize) -> Result<usize> {
        let available = self.ids.len();
        if k <= available {
            return Ok(k);
        }
        match self.options.k_policy {
            KPolicy::Reject => Err(LookalikeError::InsufficientData {
                requested: k,
                available,
            }),
            KPolicy::Clamp => Ok(available),
        }
    }

    fn scan_parallel(&self, query: &[f32], k: usize) -> Vec<Ranked> {
        let threads = rayon::current_num_threads().max(1);
        let rows_per_task = self.ids.len().div_ceil(threads).max(MIN_ROWS_PER_TASK);
        let dim = self.dim;

        self.vectors
            .par_chunks(rows_per_task * dim)
            .enumerate()
            .map(|(task, rows)| scan_rows(rows, dim, task * rows_per_task, query, k))
            .reduce(Vec::new, |mut acc, part| {
                acc.extend(part);
                acc
            })
    }
}

impl NearestNeighbors for SimilarityIndex {
    fn find_nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        SimilarityIndex::find_nearest(self, query, k)
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

/// Keep the `k` best rows of `rows` (unsorted). `offset` is the reference
/// position of the first row.
fn scan_rows(rows: &[f32], dim: usize, offset: usize, query: &[f32], k: usize) -> Vec<Ranked> {
    let mut heap: BinaryHeap<Ranked> = BinaryHeap::with_capacity(k.min(rows.len() / dim) + 1);

    for (i, row) in rows.chunks_exact(dim).enumerate() {
        let candidate = Ranked {
            distance: euclidean_distance(query, row),
            position: offset + i,
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(worst) = heap.peek() {
            if candidate < *worst {
                heap.pop();
                heap.push(candidate);
            }
        }
    }

    heap.into_vec()
}

fn invalid(reason: String) -> LookalikeError {
    LookalikeError::InvalidReferenceSet { reason }
}
