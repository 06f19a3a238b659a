//! ADAE LLM - Model-Backed Intent Extraction
//!
//! Provider-agnostic completion trait, hosted provider implementations, and
//! the `ModelIntentResolver` that turns a question plus the schema into a
//! validated intent.

pub mod providers;
pub mod resolver;

pub use providers::{
    AnthropicClient, AnthropicCompletionProvider, OpenAIClient, OpenAICompletionProvider,
};
pub use resolver::ModelIntentResolver;

use adae_core::{AdaeError, AdaeResult, ConfigError, LlmError, ProviderConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// COMPLETION PROVIDER TRAIT
// ============================================================================

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System instructions
    pub system: String,
    /// User turn
    pub user: String,
    /// Maximum tokens in the completion
    pub max_tokens: i32,
    /// Sampling temperature; 0.0 for the least variance
    pub temperature: f32,
    /// Ask the provider for a bare JSON object
    pub json_mode: bool,
}

/// Trait for text-generation backends.
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run a completion and return the raw text.
    ///
    /// # Returns
    /// * `Ok(String)` - The completion text
    /// * `Err(AdaeError::Llm)` - If the provider call fails
    async fn complete(&self, request: &CompletionRequest) -> AdaeResult<String>;

    /// Provider identifier (e.g., "anthropic").
    fn provider_id(&self) -> &str;

    /// Model identifier (e.g., "gpt-4o-mini").
    fn model_id(&self) -> &str;
}

// ============================================================================
// PROVIDER FACTORY
// ============================================================================

/// Environment variable holding the API key for a provider type.
pub fn api_key_env(provider_type: &str) -> Option<&'static str> {
    match provider_type {
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

/// Build a provider from configuration and an explicit API key.
pub fn create_provider(
    config: &ProviderConfig,
    api_key: impl Into<String>,
) -> AdaeResult<Arc<dyn CompletionProvider>> {
    let api_key = api_key.into();
    match config.provider_type.as_str() {
        "anthropic" => {
            let mut client = AnthropicClient::new(api_key, config.requests_per_minute);
            if let Some(endpoint) = &config.endpoint {
                client = client.with_base_url(endpoint.clone());
            }
            Ok(Arc::new(AnthropicCompletionProvider::new(
                client,
                config.model.clone(),
            )))
        }
        "openai" => {
            let mut client = OpenAIClient::new(api_key, config.requests_per_minute);
            if let Some(endpoint) = &config.endpoint {
                client = client.with_base_url(endpoint.clone());
            }
            Ok(Arc::new(OpenAICompletionProvider::new(
                client,
                config.model.clone(),
            )))
        }
        other => Err(AdaeError::Config(ConfigError::ProviderNotSupported {
            provider: other.to_string(),
        })),
    }
}

/// Build a provider, reading its API key from the environment.
pub fn create_provider_from_env(config: &ProviderConfig) -> AdaeResult<Arc<dyn CompletionProvider>> {
    let var = api_key_env(&config.provider_type).ok_or_else(|| {
        AdaeError::Config(ConfigError::ProviderNotSupported {
            provider: config.provider_type.clone(),
        })
    })?;
    let api_key = std::env::var(var).map_err(|_| {
        AdaeError::Config(ConfigError::MissingRequired {
            field: var.to_string(),
        })
    })?;
    create_provider(config, api_key)
}

// ============================================================================
// MOCK PROVIDER
// ============================================================================

/// Mock completion provider for testing.
///
/// Returns canned responses in order and keeps repeating the last one once
/// the list is exhausted. Every request is recorded.
pub struct MockCompletionProvider {
    responses: Vec<AdaeResult<String>>,
    cursor: AtomicUsize,
    delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Provider that always answers with `response`.
    pub fn always(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Provider that always fails with `error`.
    pub fn failing(error: LlmError) -> Self {
        Self::with_results(vec![Err(AdaeError::Llm(error))])
    }

    pub fn with_results(responses: Vec<AdaeResult<String>>) -> Self {
        Self {
            responses,
            cursor: AtomicUsize::new(0),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, request: &CompletionRequest) -> AdaeResult<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.responses.is_empty() {
            return Err(AdaeError::Llm(LlmError::ProviderNotConfigured));
        }
        self.responses[index.min(self.responses.len() - 1)].clone()
    }

    fn provider_id(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

impl std::fmt::Debug for MockCompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCompletionProvider")
            .field("responses", &self.responses.len())
            .field("calls", &self.call_count())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
