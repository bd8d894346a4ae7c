use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::index::NearestNeighbors;
use crate::server::AppState;
use crate::types::KPolicy;

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub table_id: String,
    pub created_at: String,
    pub reference_count: usize,
    pub dimensions: usize,
    pub k_policy: KPolicy,
}

pub async fn index_info(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse {
        table_id: state.table.table_id.to_string(),
        created_at: state.table.created_at.to_rfc3339(),
        reference_count: state.index.len(),
        dimensions: state.index.dimension(),
        k_policy: state.index.k_policy(),
    })
}
