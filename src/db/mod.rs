pub mod auth;
pub mod connection;
pub mod models;
pub mod realtime;
pub mod service;
pub mod store;

pub use connection::{DbPool, get_connection};
pub use models::*;
pub use store::{TranscriptBackend, TranscriptStore};

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::StoreConfig;
use realtime::RealtimeDbBackend;
use store::DuckDbBackend;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Credential Error: {0}")]
    Credential(String),
    #[error("Auth Error: {0}")]
    Auth(String),
    #[error("Request Error: {0}")]
    Request(String),
    #[error("Backend Error {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("Decode Error: {0}")]
    Decode(String),
    #[error("Database Error: {0}")]
    Database(#[from] duckdb::Error),
    #[error("Lock Error: {0}")]
    Lock(String),
    #[error("Config Error: {0}")]
    Config(String),
}

/// Opens the configured backend once at startup.
pub fn open_backend(config: &StoreConfig) -> Result<Arc<dyn TranscriptBackend>, StoreError> {
    match config.backend.as_str() {
        "realtime" => {
            let cfg = config
                .realtime
                .as_ref()
                .ok_or_else(|| StoreError::Config("missing store.realtime section".to_string()))?;
            Ok(Arc::new(RealtimeDbBackend::from_config(cfg, &config.collection)?))
        }
        "duckdb" => {
            let cfg = config
                .duckdb
                .as_ref()
                .ok_or_else(|| StoreError::Config("missing store.duckdb section".to_string()))?;
            info!("Saving transcripts to DuckDB");
            Ok(Arc::new(DuckDbBackend::new(get_connection(cfg)?)))
        }
        other => Err(StoreError::Config(format!("unknown store backend {}", other))),
    }
}
