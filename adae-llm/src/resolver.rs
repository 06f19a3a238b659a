//! Model-backed intent resolver
//!
//! Hands the schema context and the question to a completion provider,
//! then parses and validates the structured reply. Anything other than a
//! well-formed `{target_column, filter_value}` object naming a schema column
//! is an extraction failure.

use crate::{CompletionProvider, CompletionRequest};
use adae_core::{
    AdaeError, AdaeResult, ExtractionError, Intent, IntentPayload, IntentResolver, Schema,
    DEFAULT_MAX_TOKENS,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(?:json|JSON)?\s*(.*?)\s*```$").expect("Invalid code fence regex")
});

/// Intent resolver backed by an LLM completion provider.
pub struct ModelIntentResolver {
    provider: Arc<dyn CompletionProvider>,
    schema: Schema,
    max_tokens: i32,
    temperature: f32,
    backend_name: String,
}

impl ModelIntentResolver {
    /// Create a resolver with deterministic generation settings.
    pub fn new(provider: Arc<dyn CompletionProvider>, schema: Schema) -> Self {
        let backend_name = format!("model:{}/{}", provider.provider_id(), provider.model_id());
        Self {
            provider,
            schema,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
            backend_name,
        }
    }

    pub fn with_generation(mut self, max_tokens: i32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// System prompt: role, schema context and output format instructions.
    pub fn system_prompt(&self) -> String {
        let allowed = self.schema.column_names().join(", ");
        format!(
            "You are a Clinical Data Assistant. Extract filtering criteria \
             based on the following dataset schema:\n{schema}\n\n\
             Respond with a single JSON object containing exactly two string fields:\n\
             - \"target_column\": the column name to filter, one of: {allowed}\n\
             - \"filter_value\": the specific value to search for, in UPPERCASE\n\
             Do not include any other fields.",
            schema = self.schema.context(),
            allowed = allowed,
        )
    }

    fn build_request(&self, question: &str) -> CompletionRequest {
        CompletionRequest {
            system: self.system_prompt(),
            user: question.to_string(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            json_mode: true,
        }
    }

    /// Parse a raw completion into a validated intent.
    ///
    /// A markdown code fence wrapping the whole reply is tolerated; prose
    /// before or after the object is not.
    pub fn parse_response(&self, text: &str) -> Result<Intent, ExtractionError> {
        let text = text.trim();
        let body = CODE_FENCE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(text)
            .trim();

        let payload: IntentPayload =
            serde_json::from_str(body).map_err(|e| ExtractionError::MalformedResponse {
                reason: e.to_string(),
            })?;

        payload.validate(&self.schema)
    }
}

#[async_trait]
impl IntentResolver for ModelIntentResolver {
    async fn resolve(&self, question: &str) -> AdaeResult<Intent> {
        let request = self.build_request(question);
        tracing::debug!(
            backend = %self.backend_name,
            question = %question,
            "Requesting intent extraction"
        );

        let text = self.provider.complete(&request).await.map_err(|e| match e {
            AdaeError::Llm(llm) => AdaeError::Extraction(ExtractionError::Backend(llm)),
            other => other,
        })?;

        tracing::debug!(backend = %self.backend_name, response = %text, "Extraction response");

        let intent = self.parse_response(&text)?;
        Ok(intent)
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}

impl std::fmt::Debug for ModelIntentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelIntentResolver")
            .field("backend", &self.backend_name)
            .field("columns", &self.schema.column_names())
            .finish()
    }
}
