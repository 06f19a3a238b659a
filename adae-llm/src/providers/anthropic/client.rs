//! Anthropic Messages API client

use super::types::{MessagesRequest, MessagesResponse};
use crate::providers::http::{Credential, JsonTransport};
use adae_core::AdaeResult;

const PROVIDER: &str = "anthropic";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

/// Rate-limited Anthropic client.
#[derive(Debug)]
pub struct AnthropicClient {
    transport: JsonTransport,
}

impl AnthropicClient {
    /// # Arguments
    /// * `api_key` - Anthropic API key, sent as `x-api-key`
    /// * `requests_per_minute` - Client-side request budget
    pub fn new(api_key: impl Into<String>, requests_per_minute: u32) -> Self {
        Self {
            transport: JsonTransport::new(
                PROVIDER,
                DEFAULT_BASE_URL,
                api_key.into(),
                Credential::Header("x-api-key"),
                &[("anthropic-version", API_VERSION)],
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

    /// Create a message.
    pub async fn messages(&self, request: &MessagesRequest) -> AdaeResult<MessagesResponse> {
        self.transport.post("messages", request).await
    }
}
