use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lookalike::index::distance::l2_normalize;
use lookalike::types::{Embedding, ImageId};

/// Catalog-style identifiers: `images/0.jpg`, `images/1.jpg`, ...
pub fn image_ids(n: usize) -> Vec<ImageId> {
    (0..n).map(|i| format!("images/{i}.jpg")).collect()
}

/// Generate `n` random embeddings of dimension `dims` with uniform values in [-1, 1].
pub fn random_embeddings(n: usize, dims: usize, seed: u64) -> Vec<Embedding> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dims).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect()
}

/// Like [`random_embeddings`], but every row has unit L2 norm, as produced
/// by the feature extractor.
pub fn unit_embeddings(n: usize, dims: usize, seed: u64) -> Vec<Embedding> {
    let mut rows = random_embeddings(n, dims, seed);
    for row in rows.iter_mut() {
        l2_normalize(row);
    }
    rows
}

/// Embeddings drawn from a tiny integer grid so that exact distance ties are common.
pub fn grid_embeddings(n: usize, dims: usize, seed: u64) -> Vec<Embedding> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dims).map(|_| rng.gen_range(0..3) as f32).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_embeddings() {
        let rows = random_embeddings(10, 128, 42);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].len(), 128);
        assert_eq!(rows, random_embeddings(10, 128, 42));
    }

    #[test]
    fn test_unit_embeddings() {
        for row in unit_embeddings(5, 64, 7) {
            let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_image_ids() {
        let ids = image_ids(3);
        assert_eq!(ids, vec!["images/0.jpg", "images/1.jpg", "images/2.jpg"]);
    }
}
