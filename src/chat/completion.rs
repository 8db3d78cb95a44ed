use std::sync::Arc;

use tracing::{error, warn};

use crate::chat::models::Turn;
use crate::llm::{
    models::{ChatOptions, Message},
    tokens::count_tokens,
    LlmError, LlmProvider,
};

/// What a completion call produced. Both variants are displayable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Success(String),
    Failure(String),
}

impl CompletionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CompletionOutcome::Success(_))
    }

    /// The text shown as the bot's reply.
    pub fn into_text(self) -> String {
        match self {
            CompletionOutcome::Success(text) | CompletionOutcome::Failure(text) => text,
        }
    }
}

pub struct CompletionClient {
    provider: Arc<dyn LlmProvider>,
    system_prompt: String,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn LlmProvider>, system_prompt: String) -> Self {
        Self { provider, system_prompt }
    }

    /// System prompt, then every turn as a user/assistant pair, then `user_input`.
    pub fn build_messages(&self, user_input: &str, history: &[Turn]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() * 2 + 2);
        messages.push(Message::system(self.system_prompt.as_str()));
        for turn in history {
            messages.push(Message::user(turn.user.as_str()));
            messages.push(Message::assistant(turn.bot.as_str()));
        }
        messages.push(Message::user(user_input));
        messages
    }

    pub async fn complete(&self, user_input: &str, history: &[Turn], model: &str) -> CompletionOutcome {
        let messages = self.build_messages(user_input, history);
        let options = ChatOptions { model: Some(model.to_string()) };

        match self.provider.chat(&messages, options).await {
            Ok(response) => {
                let usage = format!(
                    "\n\nToken Usage:\nUser: {} | Reply: {}",
                    count_tokens(user_input),
                    count_tokens(&response.content)
                );
                CompletionOutcome::Success(response.content + &usage)
            }
            Err(LlmError::UnexpectedResponse(raw)) => {
                warn!("Completion via {} returned no choices", self.provider.name());
                CompletionOutcome::Failure(format!("[Error] API Response: {}", raw))
            }
            Err(e) => {
                error!("Completion via {} failed: {}", self.provider.name(), e);
                CompletionOutcome::Failure(format!("[Exception] {}", e))
            }
        }
    }
}
