//! OpenAI chat completion provider implementation

use super::client::OpenAIClient;
use super::types::{ChatMessage, ChatRequest, ResponseFormat};
use crate::providers::invalid_response;
use crate::{CompletionProvider, CompletionRequest};
use adae_core::AdaeResult;
use async_trait::async_trait;

/// OpenAI completion provider using GPT models.
pub struct OpenAICompletionProvider {
    client: OpenAIClient,
    model: String,
}

impl OpenAICompletionProvider {
    /// Create a new OpenAI completion provider.
    ///
    /// # Arguments
    /// * `client` - Configured HTTP client
    /// * `model` - Model name (e.g., "gpt-4o-mini", "gpt-4o")
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn with_api_key(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(OpenAIClient::new(api_key, 60), model)
    }

    fn build_request(&self, request: &CompletionRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::new("system", request.system.clone()),
                ChatMessage::new("user", request.user.clone()),
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.json_mode.then_some(ResponseFormat::JsonObject),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAICompletionProvider {
    async fn complete(&self, request: &CompletionRequest) -> AdaeResult<String> {
        let response = self
            .client
            .chat_completions(&self.build_request(request))
            .await?;

        let usage = response.usage.unwrap_or_default();
        tracing::debug!(
            provider = "openai",
            model = response.model.as_deref().unwrap_or(&self.model),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Completion received"
        );

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| invalid_response("openai", "No completion choices returned"))
    }

    fn provider_id(&self) -> &str {
        "openai"
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for OpenAICompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAICompletionProvider")
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_json_mode() {
        let provider = OpenAICompletionProvider::with_api_key("k", "gpt-4o-mini");
        let request = CompletionRequest {
            system: "sys".to_string(),
            user: "question".to_string(),
            max_tokens: 64,
            temperature: 0.0,
            json_mode: true,
        };
        let body = serde_json::to_value(provider.build_request(&request)).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["max_tokens"], 64);
    }

    #[test]
    fn test_build_request_without_json_mode_omits_format() {
        let provider = OpenAICompletionProvider::with_api_key("k", "gpt-4o-mini");
        let request = CompletionRequest {
            system: "sys".to_string(),
            user: "q".to_string(),
            max_tokens: 64,
            temperature: 0.0,
            json_mode: false,
        };
        let body = serde_json::to_value(provider.build_request(&request)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_response_shape_parses() {
        let response: crate::providers::openai::types::ChatResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"role": "assistant", "content": "{}"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
            }"#,
        )
        .unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("{}"));
    }
}
