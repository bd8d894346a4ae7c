use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use lookalike::config::Config;
use lookalike::server::routes::build_router;
use lookalike::server::AppState;
use lookalike::storage::LookalikeStore;
use lookalike::table::load_index;

#[tokio::main]
async fn main() {
    // Load .env
    let _ = dotenvy::dotenv();

    // Load config first (needed for logging setup)
    let config = Config::load(None).expect("failed to load config");

    // Initialize tracing from LoggingConfig
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .init();
        }
    }

    tracing::info!("lookalike starting");
    lookalike::metrics::init();

    // Initialize storage
    let store = LookalikeStore::from_config(&config.storage).expect("failed to initialize storage");

    // Build the similarity index before accepting any request
    let (table, index) = load_index(&store, &config)
        .await
        .expect("failed to build similarity index");
    lookalike::metrics::REFERENCE_SET_SIZE.set(table.rows as i64);

    // Build application state
    let state = AppState {
        index: Arc::new(index),
        table: Arc::new(table),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = build_router(state);

    // Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %addr, "listening");

    let listener = TcpListener::bind(&addr)
        .await
        .expect("failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("lookalike stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
