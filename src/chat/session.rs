use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::chat::completion::CompletionClient;
use crate::chat::models::{ChatSession, Turn};
use crate::config::AppConfig;
use crate::db::{self, store::TranscriptStore, StoreError};
use crate::llm::ProviderFactory;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),
    #[error("Transcript store unavailable: {0}")]
    Store(#[from] StoreError),
}

/// Routes user actions for a session to the completion client or the
/// transcript store. Holds no session state of its own.
pub struct SessionController {
    completion: CompletionClient,
    store: Arc<TranscriptStore>,
    retrieval_triggers: Vec<String>,
}

impl SessionController {
    pub fn new(completion: CompletionClient, store: Arc<TranscriptStore>, retrieval_triggers: Vec<String>) -> Self {
        let retrieval_triggers = retrieval_triggers
            .into_iter()
            .map(|t| t.to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { completion, store, retrieval_triggers }
    }

    /// Wires the configured provider and transcript backend into a controller.
    pub fn from_config(config: &AppConfig) -> Result<Self, SetupError> {
        let provider = ProviderFactory::create_default(config)
            .ok_or_else(|| SetupError::UnknownProvider(config.llm.provider.clone()))?;
        let backend = db::open_backend(&config.store)?;

        Ok(Self::new(
            CompletionClient::new(provider, config.chat.system_prompt.clone()),
            Arc::new(TranscriptStore::new(backend)),
            config.chat.retrieval_triggers.clone(),
        ))
    }

    pub fn is_retrieval_request(&self, message: &str) -> bool {
        let lowered = message.to_lowercase();
        self.retrieval_triggers.iter().any(|t| lowered.contains(t.as_str()))
    }

    /// Answers `message` and appends the resulting turn. Returns the new turn.
    pub async fn respond<'a>(&self, session: &'a mut ChatSession, message: &str, model: &str) -> &'a Turn {
        let reply = if self.is_retrieval_request(message) {
            info!("Retrieval trigger matched, loading latest transcript");
            self.retrieve_latest().await
        } else {
            self.completion
                .complete(message, session.history(), model)
                .await
                .into_text()
        };

        session.push(Turn::new(message, reply))
    }

    pub async fn retrieve_latest(&self) -> String {
        self.store.retrieve_latest().await
    }

    pub async fn save(&self, session: &ChatSession, model: &str) -> String {
        self.store.save(session.history(), model).await
    }

    pub fn clear(&self, session: &mut ChatSession) {
        session.clear();
    }
}

/// Sessions untouched for this long are dropped when a new one is created.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

struct SessionEntry {
    session: Arc<Mutex<ChatSession>>,
    last_used: Instant,
}

/// Live UI sessions by id. Each session sits behind its own async mutex which
/// callers hold for the whole action, so one session's turns stay ordered.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), idle_timeout }
    }

    /// Registers a fresh session, first dropping sessions idle past the timeout.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        // A session still borrowed by a request is never expired under it.
        sessions.retain(|_, entry| {
            entry.last_used.elapsed() < self.idle_timeout || Arc::strong_count(&entry.session) > 1
        });
        if sessions.len() < before {
            info!("Expired {} idle chat sessions", before - sessions.len());
        }

        sessions.insert(
            id,
            SessionEntry { session: Arc::new(Mutex::new(ChatSession::new())), last_used: Instant::now() },
        );
        info!("Created chat session {}", id);
        id
    }

    /// Looks up a session and marks it as used.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<ChatSession>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_used = Instant::now();
        Some(entry.session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Closed chat session {}", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
