//! Metric score orchestration.
//!
//! For each metric, in fixed order:
//! - Build the metric prompt from the shared answer context
//! - Request an integer score through the retry engine
//! - Clamp successful scores into 0..=100
//! - Fall back to the deterministic scorer on any failure
//!
//! Requests are issued through an ordered buffered stream, so with the
//! default `max_in_flight` of 1 a metric's request starts only after the
//! previous metric has resolved.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::Instrument;

use vitality_core::{build_context, fallback_score, Answer, Metric, MetricScoreMap};

use crate::config::RuntimeConfig;
use crate::connectivity::{AssumeOnline, ConnectivityProbe};
use crate::prompts::{metric_prompt, SYSTEM_PROMPT};
use crate::providers::LlmProvider;
use crate::resilience::{LlmUsage, RetryEngine, UsageTracker};
use crate::validation::IntegerScore;
use crate::RuntimeError;

/// Where a metric's score came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ScoreSource {
    /// Validated model reply
    Model { attempts: u32 },

    /// Deterministic fallback formula
    Fallback { reason: String },
}

impl ScoreSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ScoreSource::Fallback { .. })
    }
}

/// Scores plus provenance and usage for one scoring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Final score per metric
    pub scores: MetricScoreMap,

    /// How each score was produced
    pub sources: BTreeMap<Metric, ScoreSource>,

    /// LLM usage across all metrics
    pub usage: LlmUsage,

    /// When scoring finished
    pub computed_at: DateTime<Utc>,
}

impl ScoreReport {
    /// Number of metrics scored by the fallback formula.
    pub fn fallback_count(&self) -> usize {
        self.sources.values().filter(|s| s.is_fallback()).count()
    }
}

/// Scores all metrics for one user.
///
/// Holds no per-run state; concurrent `compute_*` calls are independent
/// apart from sharing the provider's rate limits.
pub struct MetricScorer {
    engine: RetryEngine,
    config: RuntimeConfig,
    schema: IntegerScore,
}

impl MetricScorer {
    /// Create a scorer that assumes the network is reachable.
    pub fn new(provider: Arc<dyn LlmProvider>, config: RuntimeConfig) -> Self {
        Self::with_probe(provider, Arc::new(AssumeOnline), config)
    }

    pub fn with_probe(
        provider: Arc<dyn LlmProvider>,
        probe: Arc<dyn ConnectivityProbe>,
        config: RuntimeConfig,
    ) -> Self {
        let engine = RetryEngine::new(
            provider,
            probe,
            config.completion.clone(),
            config.retry,
        );

        Self {
            engine,
            config,
            schema: IntegerScore::PERCENT,
        }
    }

    pub fn builder() -> MetricScorerBuilder {
        MetricScorerBuilder::new()
    }

    /// Score every metric. Always returns a complete map.
    ///
    /// Dropping the returned future abandons the in-flight request.
    pub async fn compute_metrics(&self, quiz: &[Answer], habits: &[Answer]) -> MetricScoreMap {
        self.compute_report(quiz, habits).await.scores
    }

    /// Score every metric, keeping provenance and usage.
    pub async fn compute_report(&self, quiz: &[Answer], habits: &[Answer]) -> ScoreReport {
        let context = build_context(quiz, habits);
        let usage = UsageTracker::new();
        let max_in_flight = self.config.scoring.max_in_flight.max(1);

        tracing::debug!(
            metrics = Metric::ALL.len(),
            max_in_flight,
            context_len = context.len(),
            "Scoring metrics"
        );

        let results: Vec<(Metric, u8, ScoreSource)> = stream::iter(Metric::ALL)
            .map(|metric| self.score_metric(metric, &context, quiz, habits, &usage))
            .buffered(max_in_flight)
            .collect()
            .await;

        let mut scored = BTreeMap::new();
        let mut sources = BTreeMap::new();
        for (metric, score, source) in results {
            scored.insert(metric, score);
            sources.insert(metric, source);
        }

        let report = ScoreReport {
            scores: MetricScoreMap::from_fn(|metric| {
                scored.get(&metric).copied().unwrap_or_default()
            }),
            sources,
            usage: usage.snapshot(),
            computed_at: Utc::now(),
        };

        tracing::info!(
            fallbacks = report.fallback_count(),
            llm_calls = report.usage.llm_calls,
            total_tokens = report.usage.total_tokens,
            "Metric scoring complete"
        );

        report
    }

    async fn score_metric(
        &self,
        metric: Metric,
        context: &str,
        quiz: &[Answer],
        habits: &[Answer],
        usage: &UsageTracker,
    ) -> (Metric, u8, ScoreSource) {
        let prompt = metric_prompt(metric, context);

        let result = self
            .engine
            .request_score_tracked(
                &prompt,
                SYSTEM_PROMPT,
                &self.schema,
                self.config.retry.max_attempts,
                Some(usage),
            )
            .instrument(tracing::debug_span!("score_metric", %metric))
            .await;

        match result {
            Ok(outcome) => {
                let score = outcome.value.clamp(0, 100) as u8;
                tracing::debug!(%metric, score, attempts = outcome.attempts, "Model score accepted");
                (
                    metric,
                    score,
                    ScoreSource::Model {
                        attempts: outcome.attempts,
                    },
                )
            }
            Err(e) => {
                let score = fallback_score(metric, quiz, habits);
                tracing::warn!(%metric, score, error = %e, "Falling back to deterministic score");
                (
                    metric,
                    score,
                    ScoreSource::Fallback {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }
}

/// Builder for MetricScorer.
pub struct MetricScorerBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    probe: Option<Arc<dyn ConnectivityProbe>>,
    config: RuntimeConfig,
}

impl MetricScorerBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            probe: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the LLM provider.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the connectivity probe. Defaults to [`AssumeOnline`].
    pub fn probe(mut self, probe: Arc<dyn ConnectivityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<MetricScorer, RuntimeError> {
        let provider = self
            .provider
            .ok_or_else(|| RuntimeError::ProviderNotConfigured("No provider set".to_string()))?;
        self.config.validate()?;

        let probe = self.probe.unwrap_or_else(|| Arc::new(AssumeOnline));
        Ok(MetricScorer::with_probe(provider, probe, self.config))
    }
}

impl Default for MetricScorerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
