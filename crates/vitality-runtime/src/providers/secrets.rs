//! Credential handling for completion providers.
//!
//! Credentials cannot appear in `Debug`/`Display` output and are zeroed on
//! drop. Code that needs the raw value calls [`ApiCredential::expose`] at the
//! point of use.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::providers::secrets::ApiCredential;
//!
//! // Load from config with env fallback; None when neither is set
//! let cred = ApiCredential::load(&config, "api_key", "VITALITY_API_KEY", "API key");
//!
//! // Use in HTTP header (explicit exposure)
//! request.bearer_auth(cred.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from configuration file/JSON
    Config,
    /// Loaded from environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Wrap a raw value. It cannot be logged after this point.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load from `config[config_key]`, falling back to `env_var`.
    ///
    /// Blank values count as unset. Returns `None` when neither source has a
    /// key, which self-hosted OpenAI-compatible servers accept.
    pub fn load(
        config: &JsonValue,
        config_key: &str,
        env_var: &str,
        name: &'static str,
    ) -> Option<Self> {
        let from_config = config[config_key]
            .as_str()
            .map(|value| Self::new(value, CredentialSource::Config, name))
            .filter(|cred| !cred.is_empty());

        from_config.or_else(|| {
            std::env::var(env_var)
                .ok()
                .map(|value| Self::new(value, CredentialSource::Environment, name))
                .filter(|cred| !cred.is_empty())
        })
    }

    /// Expose the credential value for use in API calls.
    ///
    /// Only call this where the value is actually needed. Never store it.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Check if the credential is blank.
    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().trim().is_empty()
    }

    /// Get the source of this credential.
    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}
