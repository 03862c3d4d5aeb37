//! Runtime configuration.
//!
//! Loaded from YAML; every section is optional and falls back to defaults.
//!
//! ```yaml
//! provider:
//!   type: openai
//!   base_url: https://api.openai.com/v1
//! completion:
//!   model: gpt-4o-mini
//!   temperature: 0.1
//!   timeout: 15s
//! retry:
//!   max_attempts: 5
//!   failure_backoff: 1000ms
//!   network_backoff: 1500ms
//! scoring:
//!   max_in_flight: 1
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::providers::{CompletionConfig, LlmProvider, ProviderRegistry};
use crate::resilience::RetryPolicy;
use crate::RuntimeError;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Serde adapter for `humantime` duration strings ("1500ms", "15s").
pub mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

/// Which provider to build, plus its provider-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider registry key
    #[serde(rename = "type", default = "default_provider_type")]
    pub kind: String,

    /// Everything else is handed to the provider factory
    #[serde(flatten)]
    pub settings: Map<String, JsonValue>,
}

fn default_provider_type() -> String {
    "openai".to_string()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: default_provider_type(),
            settings: Map::new(),
        }
    }
}

/// Orchestration settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// Metric requests allowed in flight at once. 1 scores strictly in order,
    /// which keeps within provider rate limits.
    pub max_in_flight: usize,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self { max_in_flight: 1 }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub provider: ProviderSettings,
    pub completion: CompletionConfig,
    pub retry: RetryPolicy,
    pub scoring: ScoringSettings,
}

impl RuntimeConfig {
    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Reject settings the scorer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scoring.max_in_flight == 0 {
            return Err(ConfigError::Invalid {
                field: "scoring.max_in_flight",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "retry.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ConfigError::Invalid {
                field: "completion.temperature",
                reason: format!("{} is outside 0.0..=2.0", self.completion.temperature),
            });
        }

        Ok(())
    }

    /// Build the configured provider through the default registry.
    pub fn build_provider(&self) -> Result<Arc<dyn LlmProvider>, RuntimeError> {
        let registry = ProviderRegistry::with_defaults();
        let settings = JsonValue::Object(self.provider.settings.clone());
        Ok(registry.create(&self.provider.kind, &settings)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RuntimeConfig::from_yaml("{}").unwrap();
        assert_eq!(config.provider.kind, "openai");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.failure_backoff, Duration::from_millis(1000));
        assert_eq!(config.retry.network_backoff, Duration::from_millis(1500));
        assert_eq!(config.scoring.max_in_flight, 1);
    }

    #[test]
    fn test_full_config() {
        let config = RuntimeConfig::from_yaml(
            r#"
provider:
  type: openai
  base_url: http://localhost:11434/v1
  api_key: local-key
completion:
  model: llama3.1
  temperature: 0.0
  timeout: 30s
retry:
  max_attempts: 3
  failure_backoff: 250ms
scoring:
  max_in_flight: 2
"#,
        )
        .unwrap();

        assert_eq!(config.provider.settings["base_url"], "http://localhost:11434/v1");
        assert_eq!(config.completion.model, "llama3.1");
        assert_eq!(config.completion.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.failure_backoff, Duration::from_millis(250));
        assert_eq!(config.retry.network_backoff, Duration::from_millis(1500));
        assert_eq!(config.scoring.max_in_flight, 2);

        let provider = config.build_provider().unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_rejects_zero_in_flight() {
        let result = RuntimeConfig::from_yaml("scoring:\n  max_in_flight: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "scoring.max_in_flight",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_bad_duration() {
        let result = RuntimeConfig::from_yaml("retry:\n  failure_backoff: soon\n");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }

    #[test]
    fn test_unknown_provider_type() {
        let config = RuntimeConfig::from_yaml("provider:\n  type: carrier-pigeon\n").unwrap();
        assert!(config.build_provider().is_err());
    }

    #[test]
    fn test_durations_round_trip_as_strings() {
        let yaml = serde_yaml::to_string(&RuntimeConfig::default()).unwrap();
        assert!(yaml.contains("1500ms") || yaml.contains("1s 500ms"));
    }
}
