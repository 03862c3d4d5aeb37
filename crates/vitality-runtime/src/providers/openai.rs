//! OpenAI-compatible chat-completion provider.
//!
//! Works against any server exposing `POST {base_url}/chat/completions`
//! with the OpenAI request/response shape, including self-hosted gateways.
//! Network support is behind the `openai` feature.

use super::{
    factory::ProviderFactory,
    secrets::ApiCredential,
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
#[cfg(feature = "openai")]
use std::time::Duration;

/// Environment variable consulted when the config carries no `api_key`.
pub const API_KEY_ENV: &str = "VITALITY_API_KEY";

/// Default endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[cfg(feature = "openai")]
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// OpenAI-compatible provider.
///
/// The API key is optional; without one no `Authorization` header is sent.
pub struct OpenAiProvider {
    credential: Option<ApiCredential>,
    base_url: String,
    #[cfg(feature = "openai")]
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a provider for the default endpoint with an explicit key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(
            Some(ApiCredential::new(
                api_key,
                super::CredentialSource::Programmatic,
                "Chat completion API key",
            )),
            DEFAULT_BASE_URL,
        )
    }

    /// Create from JSON configuration with environment fallback for the key.
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        let credential = ApiCredential::load(config, "api_key", API_KEY_ENV, "Chat completion API key");
        let base_url = config["base_url"].as_str().unwrap_or(DEFAULT_BASE_URL);

        match &credential {
            Some(cred) => {
                tracing::debug!(source = %cred.source(), base_url, "Using API credential")
            }
            None => tracing::debug!(base_url, "No API credential configured"),
        }

        Ok(Self::with_credential(credential, base_url))
    }

    fn with_credential(credential: Option<ApiCredential>, base_url: &str) -> Self {
        Self {
            credential,
            base_url: base_url.trim_end_matches('/').to_string(),
            #[cfg(feature = "openai")]
            client: reqwest::Client::new(),
        }
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Request body for `/chat/completions`.
#[cfg_attr(not(feature = "openai"), allow(dead_code))]
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[cfg_attr(not(feature = "openai"), allow(dead_code))]
#[derive(Debug, Deserialize)]
struct ChatCompletionBody {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageBody>,
}

#[cfg_attr(not(feature = "openai"), allow(dead_code))]
#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[cfg_attr(not(feature = "openai"), allow(dead_code))]
#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg_attr(not(feature = "openai"), allow(dead_code))]
#[derive(Debug, Default, Deserialize)]
struct UsageBody {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[cfg_attr(not(feature = "openai"), allow(dead_code))]
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[cfg_attr(not(feature = "openai"), allow(dead_code))]
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[cfg_attr(not(feature = "openai"), allow(dead_code))]
impl ChatCompletionBody {
    /// First choice's text; a missing choice reads as empty content.
    fn into_response(self) -> CompletionResponse {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let usage = self.usage.unwrap_or_default();

        CompletionResponse {
            content,
            usage: TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
            },
            model: self.model,
        }
    }
}

#[cfg_attr(not(feature = "openai"), allow(dead_code))]
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    #[cfg(feature = "openai")]
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let request = ChatCompletionRequest {
            model: &config.model,
            messages: &messages,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .timeout(config.timeout)
            .json(&request);

        // SECURITY: Only expose the credential here, at the point of use
        if let Some(credential) = &self.credential {
            builder = builder.bearer_auth(credential.expose());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(config.timeout)
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body: ChatCompletionBody = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(config.timeout)
            } else {
                ProviderError::Parse(e.to_string())
            }
        })?;

        Ok(body.into_response())
    }

    #[cfg(not(feature = "openai"))]
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        Err(ProviderError::NotConfigured(
            "OpenAI-compatible provider requires 'openai' feature".to_string(),
        ))
    }

    /// Any HTTP answer from the base URL counts as reachable.
    #[cfg(feature = "openai")]
    async fn health_check(&self) -> bool {
        self.client
            .head(&self.base_url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
            .is_ok()
    }

    #[cfg(not(feature = "openai"))]
    async fn health_check(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Factory for creating OpenAI-compatible providers from configuration.
///
/// ## Configuration Format
/// ```json
/// {
///   "api_key": "sk-...",                     // Optional, falls back to VITALITY_API_KEY env
///   "base_url": "https://api.openai.com/v1"  // Optional, custom endpoint
/// }
/// ```
pub struct OpenAiProviderFactory;

impl ProviderFactory for OpenAiProviderFactory {
    fn provider_type(&self) -> &'static str {
        "openai"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        self.validate_config(config)?;
        Ok(Arc::new(OpenAiProvider::from_config(config)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if let Some(url) = config["base_url"].as_str() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ProviderError::NotConfigured(
                    "base_url must start with http:// or https://".to_string(),
                ));
            }
        }
        Ok(())
    }
}
