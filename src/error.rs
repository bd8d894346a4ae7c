use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookalikeError {
    // Index construction errors
    /// The reference set handed to the index builder is malformed: empty,
    /// misaligned, of inconsistent dimensionality, or holding non-finite values.
    /// A failed build never yields a usable index.
    #[error("invalid reference set: {reason}")]
    InvalidReferenceSet { reason: String },

    // Query errors
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("insufficient data: requested {requested} neighbors, have {available} references")]
    InsufficientData { requested: usize, available: usize },

    // Validation errors
    #[error("validation error: {0}")]
    Validation(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    // Storage errors
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("storage error: {0}")]
    Storage(#[from] object_store::Error),

    #[error("storage path error: {0}")]
    StoragePath(#[from] object_store::path::Error),

    // Serialization errors
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode serialization error: {0}")]
    Bincode(String),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: u64, actual: u64 },

    // Config errors
    #[error("config error: {0}")]
    Config(String),

    // IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // Internal
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<Box<bincode::ErrorKind>> for LookalikeError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        LookalikeError::Bincode(e.to_string())
    }
}

impl From<toml::de::Error> for LookalikeError {
    fn from(e: toml::de::Error) -> Self {
        LookalikeError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LookalikeError>;

impl LookalikeError {
    pub fn status_code(&self) -> u16 {
        match self {
            LookalikeError::NotFound { .. } => 404,

            LookalikeError::DimensionMismatch { .. }
            | LookalikeError::InsufficientData { .. }
            | LookalikeError::Validation(_) => 400,

            LookalikeError::PayloadTooLarge(_) => 413,

            _ => 500,
        }
    }

    /// Short, stable label for the error kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            LookalikeError::InvalidReferenceSet { .. } => "invalid_reference_set",
            LookalikeError::DimensionMismatch { .. } => "dimension_mismatch",
            LookalikeError::InsufficientData { .. } => "insufficient_data",
            LookalikeError::Validation(_) => "validation",
            LookalikeError::PayloadTooLarge(_) => "payload_too_large",
            LookalikeError::NotFound { .. } => "not_found",
            LookalikeError::Storage(_) | LookalikeError::StoragePath(_) => "storage",
            LookalikeError::Json(_) | LookalikeError::Bincode(_) => "serialization",
            LookalikeError::ChecksumMismatch { .. } => "checksum",
            LookalikeError::Config(_) => "config",
            LookalikeError::Io(_) => "io",
            LookalikeError::Internal(_) => "internal",
        }
    }
}
