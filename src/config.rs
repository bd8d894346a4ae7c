//! Service configuration.
//!
//! Values come from a TOML file (explicit path, `LOOKALIKE_CONFIG`, or
//! `lookalike.toml` in the working directory) layered under `LOOKALIKE_*`
//! environment overrides. Every field has a default, so an empty file or no
//! file at all is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LookalikeError, Result};
use crate::index::{IndexOptions, DEFAULT_PARALLEL_THRESHOLD};
use crate::types::KPolicy;

const DEFAULT_CONFIG_FILE: &str = "lookalike.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub index: IndexConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Number of recommendations returned when a request omits `k`.
    pub default_k: usize,
    /// Largest `k` a request may ask for.
    pub max_k: usize,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            default_k: 5,
            max_k: 100,
            max_body_bytes: 2 * 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Local,
    S3,
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "s3" => Ok(StorageBackend::S3),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory for the local backend.
    pub root: PathBuf,
    pub bucket: Option<String>,
    pub region: String,
    /// Custom S3-compatible endpoint (MinIO, R2, ...).
    pub endpoint: Option<String>,
    /// Object key of the embedding table.
    pub table_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            root: PathBuf::from("./data"),
            bucket: None,
            region: "us-east-1".to_string(),
            endpoint: None,
            table_key: "embeddings.table".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub k_policy: KPolicy,
    /// Reference sets at least this large are scanned on the rayon pool.
    pub parallel_threshold: usize,
    /// L2-normalize every table row before building the index.
    pub normalize_on_load: bool,
    /// L2-normalize incoming query vectors.
    pub normalize_queries: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            k_policy: KPolicy::Reject,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            normalize_on_load: false,
            normalize_queries: false,
        }
    }
}

impl IndexConfig {
    pub fn options(&self) -> IndexOptions {
        IndexOptions {
            k_policy: self.k_policy,
            parallel_threshold: self.parallel_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file (if any) and apply environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::load_with(path, Path::new(DEFAULT_CONFIG_FILE), env)
    }

    /// `load` with the fallback file and variable lookup supplied by the caller.
    fn load_with<F>(path: Option<&str>, default_file: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path
            .map(PathBuf::from)
            .or_else(|| {
                lookup("LOOKALIKE_CONFIG")
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .or_else(|| default_file.exists().then(|| default_file.to_path_buf()));

        let mut config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(&p).map_err(|e| {
                    LookalikeError::Config(format!("failed to read {}: {e}", p.display()))
                })?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };

        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = env("LOOKALIKE_HOST") {
            self.server.host = v;
        }
        if let Some(v) = env("LOOKALIKE_PORT") {
            self.server.port = parse_env("LOOKALIKE_PORT", &v)?;
        }
        if let Some(v) = env("LOOKALIKE_DEFAULT_K") {
            self.server.default_k = parse_env("LOOKALIKE_DEFAULT_K", &v)?;
        }
        if let Some(v) = env("LOOKALIKE_MAX_K") {
            self.server.max_k = parse_env("LOOKALIKE_MAX_K", &v)?;
        }
        if let Some(v) = env("LOOKALIKE_STORAGE_BACKEND") {
            self.storage.backend = v.parse().map_err(LookalikeError::Config)?;
        }
        if let Some(v) = env("LOOKALIKE_STORAGE_ROOT") {
            self.storage.root = PathBuf::from(v);
        }
        if let Some(v) = env("LOOKALIKE_S3_BUCKET") {
            self.storage.bucket = Some(v);
        }
        if let Some(v) = env("LOOKALIKE_S3_REGION") {
            self.storage.region = v;
        }
        if let Some(v) = env("LOOKALIKE_S3_ENDPOINT") {
            self.storage.endpoint = Some(v);
        }
        if let Some(v) = env("LOOKALIKE_TABLE_KEY") {
            self.storage.table_key = v;
        }
        if let Some(v) = env("LOOKALIKE_K_POLICY") {
            self.index.k_policy = v.parse().map_err(LookalikeError::Config)?;
        }
        if let Some(v) = env("LOOKALIKE_PARALLEL_THRESHOLD") {
            self.index.parallel_threshold = parse_env("LOOKALIKE_PARALLEL_THRESHOLD", &v)?;
        }
        if let Some(v) = env("LOOKALIKE_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env("LOOKALIKE_LOG_FORMAT") {
            self.logging.format = v;
        }
        Ok(())
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(LookalikeError::Config("server.port must be > 0".into()));
        }
        if self.server.default_k == 0 {
            return Err(LookalikeError::Config("server.default_k must be > 0".into()));
        }
        if self.server.default_k > self.server.max_k {
            return Err(LookalikeError::Config(format!(
                "server.default_k ({}) exceeds server.max_k ({})",
                self.server.default_k, self.server.max_k
            )));
        }
        if self.storage.table_key.is_empty() {
            return Err(LookalikeError::Config(
                "storage.table_key must not be empty".into(),
            ));
        }
        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.is_none() {
            return Err(LookalikeError::Config(
                "storage.bucket is required for the s3 backend".into(),
            ));
        }
        if let Some(endpoint) = &self.storage.endpoint {
            url::Url::parse(endpoint).map_err(|e| {
                LookalikeError::Config(format!("invalid storage.endpoint '{endpoint}': {e}"))
            })?;
        }
        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(LookalikeError::Config(format!(
                "unknown logging.format '{other}' (expected 'pretty' or 'json')"
            ))),
        }
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| LookalikeError::Config(format!("invalid value for {key}: '{value}'")))
}
