mod common;

use bytes::Bytes;
use tempfile::TempDir;

use common::assertions::{assert_ids, assert_invalid_reference_set};
use common::vectors::{image_ids, random_embeddings};

use lookalike::config::{Config, StorageBackend, StorageConfig};
use lookalike::error::LookalikeError;
use lookalike::index::NearestNeighbors;
use lookalike::storage::LookalikeStore;
use lookalike::table::{load_index, EmbeddingTable};
use lookalike::types::KPolicy;

fn memory_config() -> Config {
    let mut config = Config::default();
    config.storage.backend = StorageBackend::Memory;
    config
}

#[tokio::test]
async fn test_table_write_then_read() {
    let store = LookalikeStore::in_memory();
    let table = EmbeddingTable::new(random_embeddings(50, 16, 1), image_ids(50)).unwrap();

    table.write(&store, "catalog/embeddings.table").await.unwrap();
    assert!(store.exists("catalog/embeddings.table").await.unwrap());

    let read = EmbeddingTable::read(&store, "catalog/embeddings.table")
        .await
        .unwrap();
    assert_eq!(read.id, table.id);
    assert_eq!(read.len(), 50);
    assert_eq!(read.dimensions, 16);
    assert_eq!(read.identifiers, table.identifiers);
    assert_eq!(read.embeddings, table.embeddings);
}

#[tokio::test]
async fn test_missing_table_is_not_found() {
    let store = LookalikeStore::in_memory();
    match EmbeddingTable::read(&store, "missing.table").await {
        Err(LookalikeError::NotFound { key }) => assert_eq!(key, "missing.table"),
        other => panic!("expected NotFound error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_corrupt_table_is_rejected() {
    let store = LookalikeStore::in_memory();
    store
        .put("embeddings.table", Bytes::from_static(b"definitely not bincode"))
        .await
        .unwrap();

    let result = EmbeddingTable::read(&store, "embeddings.table").await;
    assert!(result.is_err(), "garbage bytes must not decode");
}

#[tokio::test]
async fn test_table_on_local_filesystem() {
    let dir = TempDir::new().unwrap();
    let storage = StorageConfig {
        backend: StorageBackend::Local,
        root: dir.path().join("tables"),
        ..StorageConfig::default()
    };
    let store = LookalikeStore::from_config(&storage).unwrap();

    let table = EmbeddingTable::new(random_embeddings(8, 4, 2), image_ids(8)).unwrap();
    table.write(&store, &storage.table_key).await.unwrap();
    assert!(dir.path().join("tables").join("embeddings.table").exists());

    let read = EmbeddingTable::read(&store, &storage.table_key).await.unwrap();
    assert_eq!(read.embeddings, table.embeddings);
}

#[tokio::test]
async fn test_load_index_from_store() {
    let config = memory_config();
    let store = LookalikeStore::from_config(&config.storage).unwrap();
    let table = EmbeddingTable::new(
        vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
        vec!["shoe.jpg".into(), "bag.jpg".into(), "scarf.jpg".into()],
    )
    .unwrap();
    table.write(&store, &config.storage.table_key).await.unwrap();

    let (info, index) = load_index(&store, &config).await.unwrap();
    assert_eq!(info.table_id, table.id);
    assert_eq!(info.rows, 3);
    assert_eq!(info.dimensions, 2);
    assert_eq!(index.len(), 3);
    assert_eq!(index.k_policy(), KPolicy::Reject);

    let results = index.find_nearest(&[0.9, 0.1], 2).unwrap();
    assert_ids(&results, &["shoe.jpg", "scarf.jpg"]);
}

#[tokio::test]
async fn test_load_index_normalizes_rows() {
    let mut config = memory_config();
    config.index.normalize_on_load = true;
    config.index.k_policy = KPolicy::Clamp;
    let store = LookalikeStore::from_config(&config.storage).unwrap();

    // Unnormalized, [10, 0] is far from the unit query; normalized it is an exact match.
    let table = EmbeddingTable::new(
        vec![vec![10.0, 0.0], vec![0.0, 0.5]],
        vec!["far.jpg".into(), "near.jpg".into()],
    )
    .unwrap();
    table.write(&store, &config.storage.table_key).await.unwrap();

    let (_, index) = load_index(&store, &config).await.unwrap();
    let results = index.find_nearest(&[1.0, 0.0], 5).unwrap();
    assert_ids(&results, &["far.jpg", "near.jpg"]);
    assert_eq!(results[0].distance, 0.0);
}

#[tokio::test]
async fn test_load_index_rejects_empty_table() {
    let config = memory_config();
    let store = LookalikeStore::from_config(&config.storage).unwrap();
    EmbeddingTable::new(Vec::new(), Vec::new())
        .unwrap()
        .write(&store, &config.storage.table_key)
        .await
        .unwrap();

    assert_invalid_reference_set(load_index(&store, &config).await);
}

#[tokio::test]
async fn test_load_index_rejects_misaligned_table() {
    let config = memory_config();
    let store = LookalikeStore::from_config(&config.storage).unwrap();
    EmbeddingTable::new(random_embeddings(3, 4, 1), image_ids(2))
        .unwrap()
        .write(&store, &config.storage.table_key)
        .await
        .unwrap();

    assert_invalid_reference_set(load_index(&store, &config).await);
}

#[tokio::test]
async fn test_load_index_rejects_wrong_dimensions_header() {
    let config = memory_config();
    let store = LookalikeStore::from_config(&config.storage).unwrap();
    let mut table = EmbeddingTable::new(random_embeddings(4, 2, 3), image_ids(4)).unwrap();
    table.dimensions = 2048;
    table.write(&store, &config.storage.table_key).await.unwrap();

    match load_index(&store, &config).await {
        Err(LookalikeError::Validation(msg)) => assert!(msg.contains("2048"), "got: {msg}"),
        other => panic!("expected Validation error, got: {other:?}"),
    }
}
