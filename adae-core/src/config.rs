//! Configuration types
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `ADAE_*` environment variables, then command-line flags. API keys are
//! never read from the file.

use crate::constants::{
    DEFAULT_DATA_PATH, DEFAULT_MAX_TOKENS, DEFAULT_REQUESTS_PER_MINUTE,
    DEFAULT_REQUEST_TIMEOUT_MS,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Which intent resolver backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverBackend {
    /// Deterministic keyword matcher
    #[default]
    Rule,
    /// LLM-backed structured extraction
    Model,
}

impl ResolverBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Model => "model",
        }
    }
}

impl FromStr for ResolverBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rule" | "rules" | "rule-based" => Ok(Self::Rule),
            "model" | "llm" => Ok(Self::Model),
            other => Err(ConfigError::InvalidValue {
                field: "resolver".to_string(),
                value: other.to_string(),
                reason: "expected 'rule' or 'model'".to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ResolverBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LLM provider configuration for the model-backed resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// "anthropic" or "openai"
    pub provider_type: String,
    pub model: String,
    /// Base URL override (proxies, self-hosted gateways)
    pub endpoint: Option<String>,
    pub temperature: f32,
    pub max_tokens: i32,
    pub requests_per_minute: u32,
}

impl ProviderConfig {
    /// Default model for a provider type, if the type is known.
    pub fn default_model(provider_type: &str) -> Option<&'static str> {
        match provider_type {
            "anthropic" => Some("claude-3-5-haiku-20241022"),
            "openai" => Some("gpt-4o-mini"),
            _ => None,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: "anthropic".to_string(),
            model: "claude-3-5-haiku-20241022".to_string(),
            endpoint: None,
            temperature: 0.0,
            max_tokens: DEFAULT_MAX_TOKENS,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
        }
    }
}

/// Master configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdaeConfig {
    pub data_path: PathBuf,
    pub resolver: ResolverBackend,
    pub provider: ProviderConfig,
    pub request_timeout_ms: u64,
    /// Optional file receiving a copy of the run report
    pub log_path: Option<PathBuf>,
}

impl Default for AdaeConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            resolver: ResolverBackend::Rule,
            provider: ProviderConfig::default(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            log_path: None,
        }
    }
}

impl AdaeConfig {
    /// Load configuration from a TOML file. Missing fields take defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Apply `ADAE_*` environment overrides from the process environment.
    ///
    /// Environment variables:
    /// - `ADAE_DATA_PATH`: Dataset CSV path
    /// - `ADAE_RESOLVER`: "rule" or "model"
    /// - `ADAE_PROVIDER`: "anthropic" or "openai"
    /// - `ADAE_MODEL`: Provider model name
    /// - `ADAE_REQUEST_TIMEOUT_MS`: Intent resolution timeout
    /// - `ADAE_LOG_PATH`: Report log file
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("ADAE_DATA_PATH") {
            self.data_path = PathBuf::from(path);
        }
        if let Some(resolver) = lookup("ADAE_RESOLVER") {
            self.resolver = resolver.parse()?;
        }
        if let Some(provider) = lookup("ADAE_PROVIDER") {
            self.set_provider_type(&provider);
        }
        if let Some(model) = lookup("ADAE_MODEL") {
            self.provider.model = model;
        }
        if let Some(timeout) = lookup("ADAE_REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms =
                timeout.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "request_timeout_ms".to_string(),
                    value: timeout.clone(),
                    reason: "must be an integer".to_string(),
                })?;
        }
        if let Some(path) = lookup("ADAE_LOG_PATH") {
            self.log_path = Some(PathBuf::from(path));
        }
        Ok(self)
    }

    /// Switch provider type, moving the model to that provider's default
    /// when the current model belongs to the previous provider's default.
    pub fn set_provider_type(&mut self, provider_type: &str) {
        let provider_type = provider_type.trim().to_lowercase();
        let previous_default = ProviderConfig::default_model(&self.provider.provider_type);
        if previous_default == Some(self.provider.model.as_str()) {
            if let Some(model) = ProviderConfig::default_model(&provider_type) {
                self.provider.model = model.to_string();
            }
        }
        self.provider.provider_type = provider_type;
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "data_path".to_string(),
                value: String::new(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms".to_string(),
                value: "0".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        if self.resolver == ResolverBackend::Model {
            if ProviderConfig::default_model(&self.provider.provider_type).is_none() {
                return Err(ConfigError::ProviderNotSupported {
                    provider: self.provider.provider_type.clone(),
                });
            }
            if self.provider.model.trim().is_empty() {
                return Err(ConfigError::MissingRequired {
                    field: "provider.model".to_string(),
                });
            }
            if !(0.0..=2.0).contains(&self.provider.temperature) {
                return Err(ConfigError::InvalidValue {
                    field: "provider.temperature".to_string(),
                    value: self.provider.temperature.to_string(),
                    reason: "must be within 0.0..=2.0".to_string(),
                });
            }
            if self.provider.max_tokens <= 0 {
                return Err(ConfigError::InvalidValue {
                    field: "provider.max_tokens".to_string(),
                    value: self.provider.max_tokens.to_string(),
                    reason: "must be > 0".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AdaeConfig::default();
        assert_eq!(config.resolver, ResolverBackend::Rule);
        assert_eq!(config.data_path, PathBuf::from("data/adae.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = AdaeConfig::from_toml_str(
            r#"
            resolver = "model"

            [provider]
            provider_type = "openai"
            model = "gpt-4o"
            "#,
        )
        .unwrap();
        assert_eq!(config.resolver, ResolverBackend::Model);
        assert_eq!(config.provider.provider_type, "openai");
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.provider.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = AdaeConfig::from_toml_str("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adae.toml");
        std::fs::write(&path, "data_path = \"/tmp/other.csv\"\n").unwrap();
        let config = AdaeConfig::from_path(&path).unwrap();
        assert_eq!(config.data_path, PathBuf::from("/tmp/other.csv"));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = AdaeConfig::from_path(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_overrides_applied() {
        let env: HashMap<&str, &str> = [
            ("ADAE_DATA_PATH", "/data/ae.csv"),
            ("ADAE_RESOLVER", "model"),
            ("ADAE_PROVIDER", "openai"),
            ("ADAE_REQUEST_TIMEOUT_MS", "500"),
            ("ADAE_LOG_PATH", "run.log"),
        ]
        .into_iter()
        .collect();
        let config = AdaeConfig::default()
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/data/ae.csv"));
        assert_eq!(config.resolver, ResolverBackend::Model);
        assert_eq!(config.provider.provider_type, "openai");
        // Default model follows the provider switch
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.request_timeout(), Duration::from_millis(500));
        assert_eq!(config.log_path, Some(PathBuf::from("run.log")));
    }

    #[test]
    fn test_explicit_model_survives_provider_switch() {
        let mut config = AdaeConfig::default();
        config.provider.model = "claude-3-opus".to_string();
        config.set_provider_type("openai");
        assert_eq!(config.provider.model, "claude-3-opus");
    }

    #[test]
    fn test_bad_timeout_override() {
        let err = AdaeConfig::default()
            .apply_overrides(|k| (k == "ADAE_REQUEST_TIMEOUT_MS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_rejects_unknown_provider_for_model_backend() {
        let mut config = AdaeConfig {
            resolver: ResolverBackend::Model,
            ..AdaeConfig::default()
        };
        config.provider.provider_type = "gemini".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::ProviderNotSupported {
                provider: "gemini".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = AdaeConfig {
            request_timeout_ms: 0,
            ..AdaeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolver_backend_parse() {
        assert_eq!("RULE".parse::<ResolverBackend>().unwrap(), ResolverBackend::Rule);
        assert_eq!("llm".parse::<ResolverBackend>().unwrap(), ResolverBackend::Model);
        assert!("oracle".parse::<ResolverBackend>().is_err());
    }

    #[test]
    fn test_example_config_parses() {
        let config = AdaeConfig::from_toml_str(include_str!("../../adae.example.toml")).unwrap();
        assert_eq!(config, AdaeConfig::default());
        config.validate().unwrap();
    }
}
