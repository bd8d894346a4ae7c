//! Lookalike: visual similarity recommendations over precomputed image embeddings.

pub mod config;
pub mod error;
pub mod index;
pub mod metrics;
pub mod recommend;
pub mod server;
pub mod storage;
pub mod table;
pub mod types;
