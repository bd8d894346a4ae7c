use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use ulid::Ulid;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{LookalikeError, Result};
use crate::index::distance::l2_normalize;
use crate::index::{IndexOptions, SimilarityIndex};
use crate::storage::LookalikeStore;
use crate::types::{Embedding, ImageId};

/// Current on-disk layout version.
pub const TABLE_FORMAT_VERSION: u32 = 1;

/// A persisted catalog of precomputed embeddings and the images they describe.
/// Row `i` of `embeddings` belongs to `identifiers[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingTable {
    pub format_version: u32,
    /// Unique, time-ordered identifier for this table build.
    pub id: Ulid,
    pub created_at: DateTime<Utc>,
    /// Length of the first row, or 0 for an empty table.
    pub dimensions: usize,
    pub identifiers: Vec<ImageId>,
    pub embeddings: Vec<Embedding>,
    /// xxHash of the bincode-encoded (identifiers, embeddings) payload.
    pub checksum: u64,
}

impl EmbeddingTable {
    /// Create a new table from aligned embedding and identifier columns.
    pub fn new(embeddings: Vec<Embedding>, identifiers: Vec<ImageId>) -> Result<Self> {
        let checksum = Self::compute_checksum(&identifiers, &embeddings)?;
        let dimensions = embeddings.first().map_or(0, Vec::len);
        Ok(Self {
            format_version: TABLE_FORMAT_VERSION,
            id: Ulid::new(),
            created_at: Utc::now(),
            dimensions,
            identifiers,
            embeddings,
            checksum,
        })
    }

    fn compute_checksum(identifiers: &[ImageId], embeddings: &[Embedding]) -> Result<u64> {
        let payload = bincode::serialize(&(identifiers, embeddings))?;
        Ok(xxh3_64(&payload))
    }

    /// Validate the checksum of this table.
    pub fn validate_checksum(&self) -> Result<()> {
        let expected = Self::compute_checksum(&self.identifiers, &self.embeddings)?;
        if self.checksum != expected {
            return Err(LookalikeError::ChecksumMismatch {
                expected,
                actual: self.checksum,
            });
        }
        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// L2-normalize every row in place and refresh the checksum.
    ///
    /// Rows with a zero norm are left as they are; their count is returned.
    pub fn normalize(&mut self) -> Result<usize> {
        let skipped = self
            .embeddings
            .iter_mut()
            .map(|row| l2_normalize(row))
            .filter(|normalized| !normalized)
            .count();
        self.checksum = Self::compute_checksum(&self.identifiers, &self.embeddings)?;
        Ok(skipped)
    }

    /// Hand the rows to the index builder.
    pub fn into_index(self, options: IndexOptions) -> Result<SimilarityIndex> {
        SimilarityIndex::build_with_options(self.embeddings, self.identifiers, options)
    }

    /// Serialize this table to bincode bytes.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let data = bincode::serialize(self)?;
        Ok(Bytes::from(data))
    }

    /// Deserialize a table from bincode bytes, checking version, checksum, and
    /// that the `dimensions` header agrees with the rows.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let table: Self = bincode::deserialize(data)?;
        if table.format_version != TABLE_FORMAT_VERSION {
            return Err(LookalikeError::Validation(format!(
                "unsupported embedding table version {} (expected {TABLE_FORMAT_VERSION})",
                table.format_version
            )));
        }
        table.validate_checksum()?;
        let row_dimensions = table.embeddings.first().map_or(0, Vec::len);
        if table.dimensions != row_dimensions {
            return Err(LookalikeError::Validation(format!(
                "embedding table header declares {} dimensions but rows have {row_dimensions}",
                table.dimensions
            )));
        }
        Ok(table)
    }

    /// Read a table from the store.
    #[instrument(skip(store))]
    pub async fn read(store: &LookalikeStore, key: &str) -> Result<Self> {
        let data = store.get(key).await?;
        let table = Self::from_bytes(&data)?;
        debug!(
            table_id = %table.id,
            rows = table.len(),
            dimensions = table.dimensions,
            "read embedding table"
        );
        Ok(table)
    }

    /// Write this table to the store.
    #[instrument(skip(self, store), fields(table_id = %self.id, rows = self.len()))]
    pub async fn write(&self, store: &LookalikeStore, key: &str) -> Result<()> {
        let data = self.to_bytes()?;
        store.put(key, data).await?;
        debug!("wrote embedding table");
        Ok(())
    }
}
