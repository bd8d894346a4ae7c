use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::LookalikeError;
use crate::recommend::{execute_recommendation, Recommendation};
use crate::server::AppState;
use crate::types::Embedding;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// Embedding of the uploaded image.
    pub vector: Embedding,
    /// Number of similar images to return. Defaults to `server.default_k`.
    #[serde(default)]
    pub k: Option<usize>,
}

#[instrument(skip(state, payload))]
pub async fn recommend(
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<Recommendation>, ApiError> {
    let Json(req) = payload?;
    let dims = req.vector.len();
    let k = req.k.unwrap_or(state.config.server.default_k);
    if k == 0 {
        return Err(ApiError(LookalikeError::Validation("k must be > 0".into())));
    }
    if k > state.config.server.max_k {
        return Err(ApiError(LookalikeError::Validation(format!(
            "k {k} exceeds maximum of {}",
            state.config.server.max_k
        ))));
    }

    let recommendation = execute_recommendation(
        state.index.clone(),
        req.vector,
        k,
        state.config.index.normalize_queries,
    )
    .await
    .map_err(ApiError::from)?;

    info!(
        k,
        dims,
        results = recommendation.results.len(),
        elapsed_ms = recommendation.elapsed_ms,
        "recommendation complete"
    );

    Ok(Json(recommendation))
}
