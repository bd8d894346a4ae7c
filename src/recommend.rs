use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{LookalikeError, Result};
use crate::index::distance::l2_normalize;
use crate::index::NearestNeighbors;
use crate::types::{Embedding, Neighbor};

/// Ranked recommendations for one query embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub results: Vec<Neighbor>,
    pub reference_count: usize,
    pub elapsed_ms: f64,
}

/// Rank the reference set against `query` and keep the closest `k`.
///
/// When `normalize` is set the query is scaled to unit length first, matching
/// reference embeddings that were normalized at extraction time.
pub fn find_similar<I>(
    index: &I,
    mut query: Embedding,
    k: usize,
    normalize: bool,
) -> Result<Recommendation>
where
    I: NearestNeighbors + ?Sized,
{
    let start = Instant::now();

    if query.len() != index.dimension() {
        return Err(LookalikeError::DimensionMismatch {
            expected: index.dimension(),
            actual: query.len(),
        });
    }
    if normalize && !l2_normalize(&mut query) {
        return Err(LookalikeError::Validation(
            "query vector has zero or non-finite norm".into(),
        ));
    }

    let results = index.find_nearest(&query, k)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    debug!(
        returned = results.len(),
        nearest = results.first().map(|n| n.distance),
        elapsed_ms,
        "recommendation ranked"
    );

    Ok(Recommendation {
        results,
        reference_count: index.len(),
        elapsed_ms,
    })
}

/// Run [`find_similar`] on tokio's blocking pool so the O(n·d) scan never
/// stalls async workers.
#[instrument(skip(index, query), fields(dims = query.len()))]
pub async fn execute_recommendation<I>(
    index: Arc<I>,
    query: Embedding,
    k: usize,
    normalize: bool,
) -> Result<Recommendation>
where
    I: NearestNeighbors + ?Sized + 'static,
{
    crate::metrics::ACTIVE_RECOMMENDATIONS.inc();
    let _guard = crate::metrics::GaugeGuard(&crate::metrics::ACTIVE_RECOMMENDATIONS);
    let timer = crate::metrics::RECOMMEND_DURATION.start_timer();

    let outcome = tokio::task::spawn_blocking(move || find_similar(&*index, query, k, normalize))
        .await
        .map_err(|e| LookalikeError::Internal(format!("recommendation task failed: {e}")))?;
    timer.observe_duration();

    let status = match &outcome {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    crate::metrics::RECOMMENDATIONS_TOTAL
        .with_label_values(&[status])
        .inc();

    outcome
}
