//! OpenAI Chat Completions client

use super::types::{ChatRequest, ChatResponse};
use crate::providers::http::{Credential, JsonTransport};
use adae_core::AdaeResult;

const PROVIDER: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Rate-limited OpenAI client. Also works against OpenAI-compatible gateways
/// through `with_base_url`.
#[derive(Debug)]
pub struct OpenAIClient {
    transport: JsonTransport,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>, requests_per_minute: u32) -> Self {
        Self {
            transport: JsonTransport::new(
                PROVIDER,
                DEFAULT_BASE_URL,
                api_key.into(),
                Credential::Bearer,
                &[],
                requests_per_minute,
            ),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.transport.set_base_url(base_url);
        self
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub async fn chat_completions(&self, request: &ChatRequest) -> AdaeResult<ChatResponse> {
        self.transport.post("chat/completions", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let debug = format!("{:?}", OpenAIClient::new("sk-secret", 60));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("https://api.openai.com/v1"));
    }

    #[test]
    fn test_gateway_base_url() {
        let client = OpenAIClient::new("k", 60).with_base_url("http://localhost:11434/v1");
        assert_eq!(client.base_url(), "http://localhost:11434/v1");
    }
}
