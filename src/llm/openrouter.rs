use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::llm::{models::{ChatOptions, ChatResponse, CompletionBody, Message}, LlmError, LlmProvider};

/// Client for an OpenRouter-style `chat/completions` endpoint.
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    referer: String,
    title: String,
}

impl OpenRouterProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        default_model: String,
        referer: String,
        title: String,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model,
            referer,
            title,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError> {
        let model = options.model.as_deref().unwrap_or(&self.default_model);

        let body = json!({
            "model": model,
            "messages": messages,
        });

        debug!("Requesting completion from {} with {} messages", model, messages.len());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();

        // Error payloads are JSON too, so the status alone decides nothing:
        // whatever lacks a reply is reported with its raw body.
        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        let parsed: CompletionBody = match serde_json::from_value(json.clone()) {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("Completion endpoint returned {} without choices", status);
                return Err(LlmError::UnexpectedResponse(json.to_string()));
            }
        };

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::UnexpectedResponse(json.to_string()))?;

        Ok(ChatResponse {
            content,
            model: model.to_string(),
        })
    }
}
