//! # vitality-runtime
//!
//! LLM-backed metric scoring for Vitality.
//!
//! For each metric the runtime asks a chat-completion model for a single
//! integer score, validates the reply, retries transient failures with
//! linear backoff, and falls back to the deterministic scorer from
//! `vitality-core` whenever the model path gives up.
//!
//! ## Important
//!
//! Scoring never fails from the caller's point of view. The worst outcome
//! is a complete score map computed by the fallback formula.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vitality_runtime::{MetricScorer, ProviderHealthProbe, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_file("vitality.yaml")?;
//! let provider = config.build_provider()?;
//! let scorer = MetricScorer::builder()
//!     .probe(Arc::new(ProviderHealthProbe::new(provider.clone())))
//!     .provider(provider)
//!     .config(config)
//!     .build()?;
//!
//! let scores = scorer.compute_metrics(&quiz, &habits).await;
//! println!("focus = {}", scores.get(Metric::Focus));
//! ```

pub mod config;
pub mod connectivity;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod resilience;
pub mod validation;

pub use config::{ConfigError, ProviderSettings, RuntimeConfig, ScoringSettings};
pub use connectivity::{AssumeOnline, ConnectivityProbe, Offline, ProviderHealthProbe};
pub use orchestrator::{MetricScorer, MetricScorerBuilder, ScoreReport, ScoreSource};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};
pub use resilience::{
    AttemptError, FailureClass, LlmUsage, RetryEngine, RetryError, RetryOutcome, RetryPolicy,
    UsageTracker,
};
pub use validation::{IntegerScore, ResponseSchema, ValidationError};

use thiserror::Error;

/// Errors from assembling the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}
