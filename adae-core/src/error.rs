//! Error types for ADAE operations

use thiserror::Error;

/// Dataset source errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("Dataset not found at {path}")]
    NotFound { path: String },

    #[error("Failed to read dataset at {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Dataset is missing required column: {column}")]
    MissingColumn { column: String },
}

/// LLM provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("No LLM provider configured")]
    ProviderNotConfigured,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Rate limited by {provider}, retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: i64,
    },

    #[error("Invalid API key for {provider}")]
    InvalidApiKey { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Intent extraction failures. There is no safe default intent, so these are
/// always surfaced to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Target column '{column}' is not in the schema (allowed: {})", allowed.join(", "))]
    UnknownColumn { column: String, allowed: Vec<String> },

    #[error("Malformed intent response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Extraction backend failed: {0}")]
    Backend(#[from] LlmError),

    #[error("Intent resolution timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Provider not supported: {provider}")]
    ProviderNotSupported { provider: String },

    #[error("Failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config TOML: {reason}")]
    Parse { reason: String },
}

/// Master error type for all ADAE errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdaeError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl AdaeError {
    /// Whether this error belongs to the per-question extraction class.
    ///
    /// Provider failures count as extraction failures: they happen while
    /// resolving a question and must not abort a batch.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(self, AdaeError::Extraction(_) | AdaeError::Llm(_))
    }
}

/// Result type alias for ADAE operations.
pub type AdaeResult<T> = Result<T, AdaeError>;

// =============================================================================
// TESTS
// =============================================================================
