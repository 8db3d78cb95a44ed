mod common;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::common::{FakeProvider, SYSTEM_PROMPT};
    use chatrelay::chat::{CompletionClient, CompletionOutcome, Turn};
    use chatrelay::llm::{openrouter::OpenRouterProvider, tokens::count_tokens, LlmProvider};
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "mistralai/mistral-7b-instruct";

    fn provider_for(server: &MockServer) -> Arc<dyn LlmProvider> {
        Arc::new(OpenRouterProvider::new(
            "test-key".to_string(),
            format!("{}/api/v1", server.uri()),
            MODEL.to_string(),
            "https://chatbot.local".to_string(),
            "ChatRelay".to_string(),
        ))
    }

    fn history() -> Vec<Turn> {
        vec![
            Turn::new("first question", "first answer"),
            Turn::new("second question", "second answer"),
        ]
    }

    #[test]
    fn test_message_list_interleaves_history() {
        let client = CompletionClient::new(FakeProvider::replying("ok"), SYSTEM_PROMPT.to_string());
        let messages = client.build_messages("new input", &history());

        assert_eq!(messages.len(), 2 * history().len() + 2);
        let pairs: Vec<(&str, &str)> = messages
            .iter()
            .map(|m| (m.role.as_str(), m.content.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("system", SYSTEM_PROMPT),
                ("user", "first question"),
                ("assistant", "first answer"),
                ("user", "second question"),
                ("assistant", "second answer"),
                ("user", "new input"),
            ]
        );
    }

    #[test]
    fn test_message_list_without_history() {
        let client = CompletionClient::new(FakeProvider::replying("ok"), SYSTEM_PROMPT.to_string());
        let messages = client.build_messages("hello", &[]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "hello");
    }

    #[tokio::test]
    async fn test_success_appends_token_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(header("HTTP-Referer", "https://chatbot.local"))
            .and(header("X-Title", "ChatRelay"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "gen-1",
                "choices": [{"message": {"role": "assistant", "content": "Hi there!"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CompletionClient::new(provider_for(&server), SYSTEM_PROMPT.to_string());
        let outcome = client.complete("hello world", &history(), MODEL).await;

        let expected = format!(
            "Hi there!\n\nToken Usage:\nUser: {} | Reply: {}",
            count_tokens("hello world"),
            count_tokens("Hi there!")
        );
        assert_eq!(outcome, CompletionOutcome::Success(expected));

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["model"], MODEL);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0], json!({"role": "system", "content": SYSTEM_PROMPT}));
        assert_eq!(messages[5], json!({"role": "user", "content": "hello world"}));
    }

    #[tokio::test]
    async fn test_missing_choices_embeds_raw_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "No auth credentials found", "code": 401}
            })))
            .mount(&server)
            .await;

        let client = CompletionClient::new(provider_for(&server), SYSTEM_PROMPT.to_string());
        let outcome = client.complete("hello", &[], MODEL).await;

        assert!(!outcome.is_success());
        let text = outcome.into_text();
        assert!(text.starts_with("[Error] API Response: "), "{}", text);
        assert!(text.contains("No auth credentials found"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = CompletionClient::new(provider_for(&server), SYSTEM_PROMPT.to_string());
        let text = client.complete("hello", &[], MODEL).await.into_text();
        assert!(text.starts_with("[Error] API Response: "), "{}", text);
        assert!(text.contains("\"choices\":[]"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_reported_as_exception() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let client = CompletionClient::new(provider_for(&server), SYSTEM_PROMPT.to_string());
        let text = client.complete("hello", &[], MODEL).await.into_text();
        assert!(text.starts_with("[Exception] "), "{}", text);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_reported_as_exception() {
        let provider = Arc::new(OpenRouterProvider::new(
            "test-key".to_string(),
            "http://127.0.0.1:1/api/v1".to_string(),
            MODEL.to_string(),
            "https://chatbot.local".to_string(),
            "ChatRelay".to_string(),
        ));

        let client = CompletionClient::new(provider, SYSTEM_PROMPT.to_string());
        let text = client.complete("hello", &[], MODEL).await.into_text();
        assert!(text.starts_with("[Exception] Network Error"), "{}", text);
    }

    #[tokio::test]
    async fn test_selected_model_is_forwarded() {
        let provider = FakeProvider::replying("fine");
        let client = CompletionClient::new(provider.clone(), SYSTEM_PROMPT.to_string());

        client.complete("hello", &[], "gryphe/mythomax-l2-13b").await;

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls[0].1.as_deref(), Some("gryphe/mythomax-l2-13b"));
    }
}
