use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use tracing::{error, info};

use crate::chat::models::Turn;
use crate::db::models::ChatRecord;
use crate::db::service::DbService;
use crate::db::{DbPool, StoreError};

/// Shown when the collection holds no transcripts.
pub const NO_PREVIOUS_CHATS: &str = "[No previous chats found in the transcript store.]";

/// Append-only collection of chat records.
#[async_trait]
pub trait TranscriptBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Writes `record` as a new entry and returns the key it was stored under.
    async fn push(&self, record: &ChatRecord) -> Result<String, StoreError>;

    /// The entry with the greatest key, if any.
    async fn latest(&self) -> Result<Option<ChatRecord>, StoreError>;
}

/// Local DuckDB-backed collection.
pub struct DuckDbBackend {
    pool: DbPool,
}

impl DuckDbBackend {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TranscriptBackend for DuckDbBackend {
    fn name(&self) -> &str {
        "duckdb"
    }

    async fn push(&self, record: &ChatRecord) -> Result<String, StoreError> {
        let conn = self.pool.lock().map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(DbService::insert_chat(&conn, record)?)
    }

    async fn latest(&self) -> Result<Option<ChatRecord>, StoreError> {
        let conn = self.pool.lock().map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(DbService::latest_chat(&conn)?)
    }
}

/// Saves and recalls transcripts, rendering every outcome as user-facing text.
pub struct TranscriptStore {
    backend: Arc<dyn TranscriptBackend>,
}

impl TranscriptStore {
    pub fn new(backend: Arc<dyn TranscriptBackend>) -> Self {
        Self { backend }
    }

    pub async fn save(&self, history: &[Turn], model: &str) -> String {
        let record = ChatRecord::new(history, model, &Local::now());

        match self.backend.push(&record).await {
            Ok(key) => {
                info!("Saved {} turns to {} under {}", record.chat.len(), self.backend.name(), key);
                format!("Chat saved at {}", record.timestamp)
            }
            Err(e) => {
                error!("Failed to save chat to {}: {}", self.backend.name(), e);
                format!("Failed to save chat: {}", e)
            }
        }
    }

    pub async fn retrieve_latest(&self) -> String {
        match self.backend.latest().await {
            Ok(Some(record)) => format_record(&record),
            Ok(None) => NO_PREVIOUS_CHATS.to_string(),
            Err(e) => {
                error!("Failed to retrieve chat from {}: {}", self.backend.name(), e);
                format!("[Error] Could not retrieve saved transcript: {}", e)
            }
        }
    }
}

pub fn format_record(record: &ChatRecord) -> String {
    let mut text = format!("Timestamp: {}\nModel: {}\n\n", record.timestamp, record.model);
    for turn in &record.chat {
        text.push_str(&format!("You: {}\nBot: {}\n\n", turn.user, turn.bot));
    }
    text
}
