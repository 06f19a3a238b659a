//! Throttled JSON transport shared by the hosted providers.
//!
//! Each provider client owns one `JsonTransport`. Requests are admitted
//! through a `Throttle` (bounded in-flight permits plus a minimum spacing
//! between request starts), posted as JSON, and non-success statuses are
//! mapped onto `LlmError` variants.

use super::{invalid_api_key, invalid_response, parse_retry_after_ms, rate_limited, request_failed};
use adae_core::{AdaeError, AdaeResult};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::{AcquireError, Mutex, Semaphore, SemaphorePermit};

/// Where the API key goes on each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Credential {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// The key as the value of a named header
    Header(&'static str),
}

// ============================================================================
// THROTTLE
// ============================================================================

/// Client-side request budget.
#[derive(Debug)]
pub(crate) struct Throttle {
    permits: Semaphore,
    min_interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Budget for `requests_per_minute`, clamped to at least one.
    pub(crate) fn per_minute(requests_per_minute: u32) -> Self {
        let rpm = requests_per_minute.max(1);
        let spacing_ms = (60_000 / u64::from(rpm)).max(10);
        Self {
            permits: Semaphore::new(rpm as usize),
            min_interval: Duration::from_millis(spacing_ms),
            last_start: Mutex::new(None),
        }
    }

    pub(crate) fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait for a permit and for the spacing since the previous start.
    pub(crate) async fn admit(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        let permit = self.permits.acquire().await?;
        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            let since = previous.elapsed();
            if since < self.min_interval {
                tokio::time::sleep(self.min_interval - since).await;
            }
        }
        *last_start = Some(Instant::now());
        Ok(permit)
    }
}

// ============================================================================
// TRANSPORT
// ============================================================================

/// Error envelope used by both hosted APIs: `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Human-readable message from an error response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Map a non-success status onto the provider error taxonomy.
fn status_error(provider: &str, status: StatusCode, retry_after_ms: i64, message: String) -> AdaeError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => rate_limited(provider, retry_after_ms),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => invalid_api_key(provider),
        _ => request_failed(provider, i32::from(status.as_u16()), message),
    }
}

pub(crate) struct JsonTransport {
    provider: &'static str,
    http: Client,
    base_url: String,
    api_key: String,
    credential: Credential,
    fixed_headers: &'static [(&'static str, &'static str)],
    throttle: Throttle,
}

impl JsonTransport {
    pub(crate) fn new(
        provider: &'static str,
        base_url: &str,
        api_key: String,
        credential: Credential,
        fixed_headers: &'static [(&'static str, &'static str)],
        requests_per_minute: u32,
    ) -> Self {
        Self {
            provider,
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            credential,
            fixed_headers,
            throttle: Throttle::per_minute(requests_per_minute),
        }
    }

    /// Point at a different base URL (proxy or gateway).
    pub(crate) fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = match self.credential {
            Credential::Bearer => builder.bearer_auth(&self.api_key),
            Credential::Header(name) => builder.header(name, &self.api_key),
        };
        self.fixed_headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(*name, *value))
    }

    /// POST `body` as JSON to `<base_url>/<endpoint>` and decode the reply.
    pub(crate) async fn post<Req, Res>(&self, endpoint: &str, body: &Req) -> AdaeResult<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let _permit = self.throttle.admit().await.map_err(|e| {
            request_failed(self.provider, 0, format!("Rate limiter closed: {}", e))
        })?;

        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .authorize(self.http.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| request_failed(self.provider, 0, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|e| {
                invalid_response(self.provider, format!("Failed to decode response: {}", e))
            });
        }

        let retry_after_ms = parse_retry_after_ms(response.headers()).unwrap_or(0);
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            provider = self.provider,
            status = status.as_u16(),
            "Provider request rejected"
        );
        Err(status_error(self.provider, status, retry_after_ms, error_message(&body)))
    }
}

impl std::fmt::Debug for JsonTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonTransport")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adae_core::LlmError;

    fn transport(key: &str) -> JsonTransport {
        JsonTransport::new(
            "test",
            "https://example.invalid/v1/",
            key.to_string(),
            Credential::Bearer,
            &[],
            60,
        )
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error("p", StatusCode::TOO_MANY_REQUESTS, 1500, String::new()),
            AdaeError::Llm(LlmError::RateLimited {
                provider: "p".to_string(),
                retry_after_ms: 1500
            })
        );
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            assert!(matches!(
                status_error("p", status, 0, String::new()),
                AdaeError::Llm(LlmError::InvalidApiKey { .. })
            ));
        }
        assert_eq!(
            status_error("p", StatusCode::BAD_GATEWAY, 0, "upstream".to_string()),
            AdaeError::Llm(LlmError::RequestFailed {
                provider: "p".to_string(),
                status: 502,
                message: "upstream".to_string()
            })
        );
    }

    #[test]
    fn test_error_message_prefers_envelope() {
        assert_eq!(
            error_message(r#"{"error": {"type": "overloaded_error", "message": "Overloaded"}}"#),
            "Overloaded"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_throttle_spacing() {
        assert_eq!(Throttle::per_minute(60).min_interval(), Duration::from_secs(1));
        assert_eq!(Throttle::per_minute(0).min_interval(), Duration::from_secs(60));
        assert_eq!(
            Throttle::per_minute(100_000).min_interval(),
            Duration::from_millis(10)
        );
    }

    #[tokio::test]
    async fn test_first_admit_does_not_wait() {
        let throttle = Throttle::per_minute(1);
        let started = Instant::now();
        let _permit = throttle.admit().await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_base_url_trimmed_and_key_redacted() {
        let mut t = transport("sk-secret");
        assert_eq!(t.base_url(), "https://example.invalid/v1");
        t.set_base_url("http://localhost:8089/");
        assert_eq!(t.base_url(), "http://localhost:8089");

        let debug = format!("{:?}", t);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-secret"));
    }
}
