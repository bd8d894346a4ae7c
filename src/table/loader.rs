use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use ulid::Ulid;

use crate::config::Config;
use crate::error::Result;
use crate::index::{NearestNeighbors, SimilarityIndex};
use crate::storage::LookalikeStore;

use super::embedding_table::EmbeddingTable;

/// Provenance of the table an index was built from.
#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    pub table_id: Ulid,
    pub created_at: DateTime<Utc>,
    pub rows: usize,
    pub dimensions: usize,
}

/// Read the configured embedding table and build the similarity index from it.
///
/// This is the one-time startup step; the returned index is immutable.
#[instrument(skip_all, fields(table_key = %config.storage.table_key))]
pub async fn load_index(
    store: &LookalikeStore,
    config: &Config,
) -> Result<(TableInfo, SimilarityIndex)> {
    let start = Instant::now();
    let mut table = EmbeddingTable::read(store, &config.storage.table_key).await?;

    if config.index.normalize_on_load {
        let skipped = table.normalize()?;
        if skipped > 0 {
            warn!(skipped, "rows with zero norm left unnormalized");
        }
    }

    let table_id = table.id;
    let created_at = table.created_at;
    let index = table.into_index(config.index.options())?;
    let info = TableInfo {
        table_id,
        created_at,
        rows: index.len(),
        dimensions: index.dimension(),
    };

    info!(
        table_id = %info.table_id,
        rows = info.rows,
        dimensions = info.dimensions,
        k_policy = %config.index.k_policy,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "similarity index built"
    );

    Ok((info, index))
}
