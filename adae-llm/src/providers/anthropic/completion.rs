//! Anthropic (Claude) completion provider implementation

use super::client::AnthropicClient;
use super::types::{ContentBlock, InputMessage, MessagesRequest};
use crate::providers::invalid_response;
use crate::{CompletionProvider, CompletionRequest};
use adae_core::AdaeResult;
use async_trait::async_trait;

const JSON_ONLY_INSTRUCTION: &str =
    "IMPORTANT: Respond with valid JSON only. No markdown code blocks, no explanations.";

/// Anthropic completion provider using Claude models.
pub struct AnthropicCompletionProvider {
    client: AnthropicClient,
    model: String,
}

impl AnthropicCompletionProvider {
    /// Create a new Anthropic completion provider.
    ///
    /// # Arguments
    /// * `client` - Configured HTTP client
    /// * `model` - Model name (e.g., "claude-3-5-haiku-20241022")
    pub fn new(client: AnthropicClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Create provider with the default request budget.
    pub fn with_api_key(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(AnthropicClient::new(api_key, 50), model)
    }

    /// Anthropic has no JSON mode; JSON output is requested in the system prompt.
    fn build_request(&self, request: &CompletionRequest) -> MessagesRequest {
        let system = if request.json_mode {
            format!("{}\n\n{}", request.system, JSON_ONLY_INSTRUCTION)
        } else {
            request.system.clone()
        };

        MessagesRequest {
            model: self.model.clone(),
            system,
            messages: vec![InputMessage::user(request.user.clone())],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    /// Extract text from content blocks.
    fn extract_text(content: Vec<ContentBlock>) -> String {
        content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl CompletionProvider for AnthropicCompletionProvider {
    async fn complete(&self, request: &CompletionRequest) -> AdaeResult<String> {
        let response = self.client.messages(&self.build_request(request)).await?;

        let usage = response.usage.unwrap_or_default();
        tracing::debug!(
            provider = "anthropic",
            model = %response.model,
            stop_reason = response.stop_reason.as_deref().unwrap_or("-"),
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Completion received"
        );

        let text = Self::extract_text(response.content);
        if text.trim().is_empty() {
            return Err(invalid_response("anthropic", "Empty response"));
        }
        Ok(text)
    }

    fn provider_id(&self) -> &str {
        "anthropic"
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for AnthropicCompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicCompletionProvider")
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json_mode: bool) -> CompletionRequest {
        CompletionRequest {
            system: "Extract filters.".to_string(),
            user: "Which subjects had nausea?".to_string(),
            max_tokens: 128,
            temperature: 0.0,
            json_mode,
        }
    }

    #[test]
    fn test_build_request_appends_json_instruction() {
        let provider = AnthropicCompletionProvider::with_api_key("k", "claude-3-5-haiku-20241022");
        let body = serde_json::to_value(provider.build_request(&request(true))).unwrap();
        assert_eq!(body["model"], "claude-3-5-haiku-20241022");
        assert_eq!(body["max_tokens"], 128);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Which subjects had nausea?");
        let system = body["system"].as_str().unwrap();
        assert!(system.starts_with("Extract filters."));
        assert!(system.contains("valid JSON only"));
    }

    #[test]
    fn test_build_request_plain_mode() {
        let provider = AnthropicCompletionProvider::with_api_key("k", "m");
        let body = serde_json::to_value(provider.build_request(&request(false))).unwrap();
        assert_eq!(body["system"], "Extract filters.");
    }

    #[test]
    fn test_extract_text_skips_non_text_blocks() {
        let response: crate::providers::anthropic::types::MessagesResponse = serde_json::from_str(
            r#"{
                "model": "claude",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 10, "output_tokens": 5},
                "content": [
                    {"type": "thinking", "thinking": "..."},
                    {"type": "text", "text": "{\"target_column\":\"AESEV\"}"}
                ]
            }"#,
        )
        .unwrap();
        let text = AnthropicCompletionProvider::extract_text(response.content);
        assert_eq!(text, "{\"target_column\":\"AESEV\"}");
    }

    #[test]
    fn test_identity() {
        let provider = AnthropicCompletionProvider::with_api_key("k", "claude-x");
        assert_eq!(provider.provider_id(), "anthropic");
        assert_eq!(provider.model_id(), "claude-x");
    }
}
