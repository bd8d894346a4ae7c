pub mod handlers;
pub mod routes;

use std::sync::Arc;

use crate::config::Config;
use crate::index::SimilarityIndex;
use crate::table::TableInfo;

/// Shared application state injected into all handlers via axum's State extractor.
///
/// The index is built once before the router is created and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<SimilarityIndex>,
    pub table: Arc<TableInfo>,
    pub config: Arc<Config>,
}
