//! Chat-completion provider abstractions.
//!
//! The scoring pipeline treats the model as an opaque request/response
//! service: it sends a system and a user message and gets text back.
//! Validation of that text happens in the runtime, never in the provider.
//!
//! ## Security
//!
//! All providers use the [`secrets`] module for credential handling.
//! See [`ApiCredential`] for the recommended patterns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod factory;
mod openai;
pub mod secrets;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use openai::{OpenAiProvider, OpenAiProviderFactory, API_KEY_ENV, DEFAULT_BASE_URL};
pub use secrets::{ApiCredential, CredentialSource};

/// Errors from completion providers.
///
/// Variants are the classification the retry engine works from: only
/// [`ProviderError::Network`] and [`ProviderError::Timeout`] count as
/// network failures.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("Authentication failed")]
    Auth,

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether this failure is about reaching the endpoint at all.
    pub fn is_network(&self) -> bool {
        matches!(self, ProviderError::Network(_) | ProviderError::Timeout(_))
    }
}

/// Configuration for a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Model to use
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature, kept low for repeatable scores
    pub temperature: f32,

    /// Request timeout
    #[serde(with = "crate::config::humantime_duration")]
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 8,
            temperature: 0.1,
            timeout: Duration::from_secs(15),
        }
    }
}

/// A chat message for completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response from a completion.
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    /// Generated content
    pub content: String,

    /// Token usage
    pub usage: TokenUsage,

    /// Model used
    pub model: String,
}

impl CompletionResponse {
    /// A response with only content, as returned by simple providers.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Token usage from a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the completion
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used.
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// Provider abstraction allows swapping chat-completion backends.
///
/// Providers are constructed once and passed explicitly to the scorer;
/// there is no process-wide client instance.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Execute a chat completion.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Check whether the provider's endpoint can be reached.
    async fn health_check(&self) -> bool;

    /// Get provider name for logs.
    fn name(&self) -> &str;
}
