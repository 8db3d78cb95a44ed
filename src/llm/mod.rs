pub mod models;
pub mod openrouter;
pub mod tokens;

use openrouter::OpenRouterProvider;

use async_trait::async_trait;
use thiserror::Error;
use std::sync::Arc;

use crate::config::AppConfig;
use models::{ChatOptions, ChatResponse, Message};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("Decode Error: {0}")]
    Decode(String),
    /// The endpoint answered with JSON that carries no reply. Holds the raw body.
    #[error("Unexpected Response: {0}")]
    UnexpectedResponse(String),
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError>;
}

/// Builds the configured provider.
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_default(config: &AppConfig) -> Option<Arc<dyn LlmProvider>> {
        match config.llm.provider.as_str() {
            "openrouter" => Some(Arc::new(OpenRouterProvider::new(
                config.llm.api_key.clone(),
                config.llm.api_base.clone(),
                config.default_model().to_string(),
                config.llm.referer.clone(),
                config.llm.title.clone(),
            ))),
            _ => None,
        }
    }
}
