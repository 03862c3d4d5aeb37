//! Provider factory pattern for dynamic provider registration.
//!
//! Providers register factories that create instances from configuration,
//! so the config file can name a provider type without code changes.
//!
//! ## Usage
//!
//! ```ignore
//! let registry = ProviderRegistry::with_defaults();
//! let provider = registry.create("openai", &settings)?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{LlmProvider, ProviderError};

/// Factory for creating providers from configuration.
pub trait ProviderFactory: Send + Sync {
    /// Unique identifier for this provider type (e.g. "openai").
    fn provider_type(&self) -> &'static str;

    /// Create a provider instance from JSON configuration.
    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError>;

    /// Validate configuration without creating a provider.
    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError>;
}

/// Registry of available provider factories.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory, replacing any with the same type.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories
            .insert(factory.provider_type().to_string(), factory);
    }

    /// Create a provider from type name and configuration.
    pub fn create(
        &self,
        provider_type: &str,
        config: &JsonValue,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        self.factories
            .get(provider_type)
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!(
                    "Unknown provider type: '{}'. Available: {:?}",
                    provider_type,
                    self.available_types()
                ))
            })?
            .create(config)
    }

    /// List available provider types.
    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a provider type is registered.
    pub fn has_provider(&self, provider_type: &str) -> bool {
        self.factories.contains_key(provider_type)
    }

    /// Create a registry with all built-in providers registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::OpenAiProviderFactory));
        registry
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.available_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ChatMessage, CompletionConfig, CompletionResponse};
    use async_trait::async_trait;

    struct MockProvider {
        name: String,
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn complete(
            &self,
            _messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            Ok(CompletionResponse::text("50"))
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    struct MockProviderFactory;

    impl ProviderFactory for MockProviderFactory {
        fn provider_type(&self) -> &'static str {
            "mock"
        }

        fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
            let name = config["name"].as_str().unwrap_or("mock-provider").to_string();
            Ok(Arc::new(MockProvider { name }))
        }

        fn validate_config(&self, _config: &JsonValue) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_register_and_create() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockProviderFactory));

        assert!(registry.has_provider("mock"));
        assert!(!registry.has_provider("unknown"));

        let provider = registry
            .create("mock", &serde_json::json!({"name": "test-mock"}))
            .unwrap();
        assert_eq!(provider.name(), "test-mock");
    }

    #[test]
    fn test_registry_unknown_provider() {
        let registry = ProviderRegistry::new();

        match registry.create("unknown", &serde_json::json!({})) {
            Err(ProviderError::NotConfigured(msg)) => {
                assert!(msg.contains("Unknown provider type"));
            }
            _ => panic!("Expected NotConfigured error"),
        }
    }

    #[test]
    fn test_defaults_include_openai() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(registry.available_types(), vec!["openai"]);
    }
}
