#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatrelay::chat::{CompletionClient, SessionController};
use chatrelay::config::DatabaseConfig;
use chatrelay::db::{get_connection, store::DuckDbBackend, DbPool, TranscriptStore};
use chatrelay::llm::{
    models::{ChatOptions, ChatResponse, Message},
    LlmError, LlmProvider,
};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Provider that answers every request with a canned result and records what it was sent.
pub struct FakeProvider {
    reply: Result<String, String>,
    pub calls: Mutex<Vec<(Vec<Message>, Option<String>)>>,
}

impl FakeProvider {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self { reply: Ok(reply.to_string()), calls: Mutex::new(Vec::new()) })
    }

    /// Fails as if the endpoint answered without choices.
    pub fn unexpected(raw: &str) -> Arc<Self> {
        Arc::new(Self { reply: Err(raw.to_string()), calls: Mutex::new(Vec::new()) })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError> {
        self.calls.lock().unwrap().push((messages.to_vec(), options.model.clone()));
        match &self.reply {
            Ok(content) => Ok(ChatResponse {
                content: content.clone(),
                model: options.model.unwrap_or_default(),
            }),
            Err(raw) => Err(LlmError::UnexpectedResponse(raw.clone())),
        }
    }
}

pub fn memory_pool() -> DbPool {
    get_connection(&DatabaseConfig { path: ":memory:".to_string() }).unwrap()
}

pub fn memory_store(pool: DbPool) -> Arc<TranscriptStore> {
    Arc::new(TranscriptStore::new(Arc::new(DuckDbBackend::new(pool))))
}

pub fn default_triggers() -> Vec<String> {
    vec!["show history".to_string(), "retrieve saved transcript".to_string()]
}

pub fn controller_with(provider: Arc<FakeProvider>, pool: DbPool) -> SessionController {
    SessionController::new(
        CompletionClient::new(provider, SYSTEM_PROMPT.to_string()),
        memory_store(pool),
        default_triggers(),
    )
}
