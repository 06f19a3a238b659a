//! LLM provider implementations
//!
//! Concrete implementations of the `CompletionProvider` trait for hosted
//! LLM services, plus the error constructors they share.

pub mod anthropic;
pub(crate) mod http;
pub mod openai;

pub use anthropic::{AnthropicClient, AnthropicCompletionProvider};
pub use openai::{OpenAIClient, OpenAICompletionProvider};

use adae_core::{AdaeError, LlmError};

pub(crate) fn request_failed(provider: &str, status: i32, message: impl Into<String>) -> AdaeError {
    AdaeError::Llm(LlmError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    })
}

pub(crate) fn rate_limited(provider: &str, retry_after_ms: i64) -> AdaeError {
    AdaeError::Llm(LlmError::RateLimited {
        provider: provider.to_string(),
        retry_after_ms,
    })
}

pub(crate) fn invalid_api_key(provider: &str) -> AdaeError {
    AdaeError::Llm(LlmError::InvalidApiKey {
        provider: provider.to_string(),
    })
}

pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> AdaeError {
    AdaeError::Llm(LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    })
}

pub(crate) fn parse_retry_after_ms(headers: &reqwest::header::HeaderMap) -> Option<i64> {
    headers
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<f64>().ok())
        .map(|seconds| (seconds * 1000.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    #[test]
    fn test_parse_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("1.5"));
        assert_eq!(parse_retry_after_ms(&headers), Some(1500));
    }

    #[test]
    fn test_parse_retry_after_missing_or_garbage() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after_ms(&headers), None);
        headers.insert("retry-after", HeaderValue::from_static("tomorrow"));
        assert_eq!(parse_retry_after_ms(&headers), None);
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(
            rate_limited("openai", 10),
            AdaeError::Llm(LlmError::RateLimited { .. })
        ));
        assert!(matches!(
            invalid_api_key("anthropic"),
            AdaeError::Llm(LlmError::InvalidApiKey { .. })
        ));
    }
}
