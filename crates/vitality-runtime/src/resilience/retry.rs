//! Retry engine for model-backed scoring requests.
//!
//! One call walks a small state machine:
//! 1. Preflight connectivity probe; unreachable fails without any attempt
//! 2. Up to `max_attempts` provider calls, each validated against a schema
//! 3. After a failed attempt, network-class failures re-probe connectivity
//!    and abort if it is gone; otherwise sleep `base x (attempt + 1)`
//! 4. No sleep after the final attempt
//!
//! Failure classes come from error variants, never from message text.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::humantime_duration;
use crate::connectivity::ConnectivityProbe;
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError};
use crate::validation::{ResponseSchema, ValidationError};

use super::usage::UsageTracker;

/// Why a single attempt failed.
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Response failed validation: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Backoff class of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Endpoint could not be reached or timed out
    Network,
    /// Anything else: bad reply, API error, rate limit
    Other,
}

impl AttemptError {
    pub fn class(&self) -> FailureClass {
        match self {
            AttemptError::Provider(e) if e.is_network() => FailureClass::Network,
            _ => FailureClass::Other,
        }
    }
}

/// Terminal failure of a scoring request.
#[derive(Error, Debug)]
pub enum RetryError {
    #[error("No network connectivity")]
    NoConnectivity,

    #[error("Network connectivity lost after {attempts} attempt(s): {last}")]
    ConnectivityLost {
        attempts: u32,
        #[source]
        last: AttemptError,
    },

    #[error("{}", describe_exhausted(.attempts, .last))]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        last: Option<AttemptError>,
    },
}

fn describe_exhausted(attempts: &u32, last: &Option<AttemptError>) -> String {
    match last {
        Some(error) => format!("Failed after {} attempts: {}", attempts, error),
        None => "Failed after multiple attempts".to_string(),
    }
}

/// Attempt budget and backoff bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts per request, including the first
    pub max_attempts: u32,

    /// Backoff base for non-network failures
    #[serde(with = "humantime_duration")]
    pub failure_backoff: Duration,

    /// Backoff base for network failures while still reachable
    #[serde(with = "humantime_duration")]
    pub network_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            failure_backoff: Duration::from_millis(1000),
            network_backoff: Duration::from_millis(1500),
        }
    }
}

impl RetryPolicy {
    /// Linear delay after the 0-indexed `attempt` failed.
    pub fn delay_for(&self, class: FailureClass, attempt: u32) -> Duration {
        let base = match class {
            FailureClass::Network => self.network_backoff,
            FailureClass::Other => self.failure_backoff,
        };
        base * (attempt + 1)
    }
}

/// A validated reply and how many attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryOutcome<T> {
    pub value: T,
    pub attempts: u32,
}

/// Sends scoring requests with retry, backoff and validation.
///
/// Holds no mutable state, so one engine can serve any number of requests.
pub struct RetryEngine {
    provider: Arc<dyn LlmProvider>,
    probe: Arc<dyn ConnectivityProbe>,
    completion: CompletionConfig,
    policy: RetryPolicy,
}

impl RetryEngine {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        probe: Arc<dyn ConnectivityProbe>,
        completion: CompletionConfig,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            probe,
            completion,
            policy,
        }
    }

    /// Request a reply satisfying `schema`, trying at most `max_attempts` times.
    pub async fn request_score<S: ResponseSchema>(
        &self,
        prompt: &str,
        system_message: &str,
        schema: &S,
        max_attempts: u32,
    ) -> Result<RetryOutcome<S::Output>, RetryError> {
        self.request_score_tracked(prompt, system_message, schema, max_attempts, None)
            .await
    }

    /// Same as [`RetryEngine::request_score`], recording token usage.
    pub async fn request_score_tracked<S: ResponseSchema>(
        &self,
        prompt: &str,
        system_message: &str,
        schema: &S,
        max_attempts: u32,
        usage: Option<&UsageTracker>,
    ) -> Result<RetryOutcome<S::Output>, RetryError> {
        if !self.probe.is_reachable().await {
            tracing::warn!(provider = self.provider.name(), "No connectivity, skipping request");
            return Err(RetryError::NoConnectivity);
        }

        let messages = vec![ChatMessage::system(system_message), ChatMessage::user(prompt)];
        let mut last_error = None;

        for attempt in 0..max_attempts {
            tracing::debug!(
                attempt = attempt + 1,
                max_attempts,
                schema = schema.name(),
                "Requesting completion"
            );

            let error = match self.attempt(&messages, schema, usage).await {
                Ok(value) => {
                    return Ok(RetryOutcome {
                        value,
                        attempts: attempt + 1,
                    })
                }
                Err(error) => error,
            };

            let class = error.class();
            tracing::warn!(
                attempt = attempt + 1,
                max_attempts,
                class = ?class,
                error = %error,
                "Completion attempt failed"
            );

            if attempt + 1 < max_attempts {
                if class == FailureClass::Network && !self.probe.is_reachable().await {
                    tracing::warn!(attempt = attempt + 1, "Connectivity lost, abandoning retries");
                    return Err(RetryError::ConnectivityLost {
                        attempts: attempt + 1,
                        last: error,
                    });
                }
                tokio::time::sleep(self.policy.delay_for(class, attempt)).await;
            }

            last_error = Some(error);
        }

        Err(RetryError::ExhaustedRetries {
            attempts: max_attempts,
            last: last_error,
        })
    }

    async fn attempt<S: ResponseSchema>(
        &self,
        messages: &[ChatMessage],
        schema: &S,
        usage: Option<&UsageTracker>,
    ) -> Result<S::Output, AttemptError> {
        let response = match self.provider.complete(messages.to_vec(), &self.completion).await {
            Ok(response) => response,
            Err(e) => {
                if let Some(usage) = usage {
                    usage.record_failure();
                }
                return Err(e.into());
            }
        };

        if let Some(usage) = usage {
            usage.record(&response.usage);
        }

        if response.content.trim().is_empty() {
            return Err(AttemptError::EmptyResponse);
        }

        Ok(schema.parse(&response.content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{CompletionResponse, TokenUsage};
    use crate::validation::IntegerScore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    type Script = Box<dyn Fn(u32) -> Result<CompletionResponse, ProviderError> + Send + Sync>;

    /// Provider whose reply depends on the 0-indexed call number.
    struct ScriptedProvider {
        script: Script,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn new(
            script: impl Fn(u32) -> Result<CompletionResponse, ProviderError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                script: Box::new(script),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(
            &self,
            messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            assert_eq!(messages.len(), 2);
            assert_eq!(messages[0].role, "system");
            assert_eq!(messages[1].role, "user");
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            (self.script)(call)
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// Probe answering from a list; the last answer repeats.
    struct ScriptedProbe {
        answers: Vec<bool>,
        checks: AtomicU32,
    }

    impl ScriptedProbe {
        fn new(answers: &[bool]) -> Arc<Self> {
            Arc::new(Self {
                answers: answers.to_vec(),
                checks: AtomicU32::new(0),
            })
        }

        fn checks(&self) -> u32 {
            self.checks.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConnectivityProbe for ScriptedProbe {
        async fn is_reachable(&self) -> bool {
            let i = self.checks.fetch_add(1, Ordering::SeqCst) as usize;
            self.answers[i.min(self.answers.len() - 1)]
        }
    }

    fn engine(provider: Arc<ScriptedProvider>, probe: Arc<ScriptedProbe>) -> RetryEngine {
        RetryEngine::new(provider, probe, CompletionConfig::default(), RetryPolicy::default())
    }

    async fn score(engine: &RetryEngine, max_attempts: u32) -> Result<RetryOutcome<i64>, RetryError> {
        engine
            .request_score("Score wisdom.", "Output only an integer 0-100.", &IntegerScore::PERCENT, max_attempts)
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success() {
        let provider = ScriptedProvider::new(|_| Ok(CompletionResponse::text("73")));
        let probe = ScriptedProbe::new(&[true]);
        let engine = engine(provider.clone(), probe.clone());

        let outcome = score(&engine, 5).await.unwrap();
        assert_eq!(outcome, RetryOutcome { value: 73, attempts: 1 });
        assert_eq!(provider.calls(), 1);
        assert_eq!(probe.checks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_connectivity_makes_no_attempt() {
        let provider = ScriptedProvider::new(|_| Ok(CompletionResponse::text("73")));
        let probe = ScriptedProbe::new(&[false]);
        let engine = engine(provider.clone(), probe);

        let result = score(&engine, 5).await;
        assert!(matches!(result, Err(RetryError::NoConnectivity)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connectivity_lost_aborts_retries() {
        let provider =
            ScriptedProvider::new(|_| Err(ProviderError::Network("connection reset".to_string())));
        let probe = ScriptedProbe::new(&[true, false]);
        let engine = engine(provider.clone(), probe.clone());

        let result = score(&engine, 5).await;
        match result {
            Err(RetryError::ConnectivityLost { attempts, last }) => {
                assert_eq!(attempts, 1);
                assert_eq!(last.class(), FailureClass::Network);
            }
            other => panic!("Expected ConnectivityLost, got {:?}", other),
        }
        assert_eq!(provider.calls(), 1);
        assert_eq!(probe.checks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_numeric_replies_exhaust_budget() {
        let provider = ScriptedProvider::new(|_| Ok(CompletionResponse::text("I'd say about seventy")));
        let probe = ScriptedProbe::new(&[true]);
        let engine = engine(provider.clone(), probe.clone());

        match score(&engine, 5).await {
            Err(RetryError::ExhaustedRetries { attempts, last }) => {
                assert_eq!(attempts, 5);
                assert!(matches!(last, Some(AttemptError::Validation(_))));
            }
            other => panic!("Expected ExhaustedRetries, got {:?}", other),
        }
        assert_eq!(provider.calls(), 5);
        // Validation failures never re-probe
        assert_eq!(probe.checks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_responses_are_retried() {
        let provider = ScriptedProvider::new(|call| match call {
            0 => Ok(CompletionResponse::text("")),
            1 => Ok(CompletionResponse::text("  \n")),
            _ => Ok(CompletionResponse::text("42")),
        });
        let engine = engine(provider.clone(), ScriptedProbe::new(&[true]));

        let outcome = score(&engine, 5).await.unwrap();
        assert_eq!(outcome.value, 42);
        assert_eq!(outcome.attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_linear_backoff_for_other_failures() {
        let provider = ScriptedProvider::new(|call| match call {
            0 | 1 => Err(ProviderError::Api {
                status: 503,
                message: "overloaded".to_string(),
            }),
            _ => Ok(CompletionResponse::text("60")),
        });
        let engine = engine(provider, ScriptedProbe::new(&[true]));

        let start = Instant::now();
        score(&engine, 5).await.unwrap();
        let elapsed = start.elapsed();

        // 1000ms x 1 + 1000ms x 2
        assert!(elapsed >= Duration::from_millis(3000), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(3100), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_backoff_when_still_reachable() {
        let provider = ScriptedProvider::new(|call| match call {
            0 => Err(ProviderError::Timeout(Duration::from_secs(15))),
            _ => Ok(CompletionResponse::text("55")),
        });
        let probe = ScriptedProbe::new(&[true]);
        let engine = engine(provider, probe.clone());

        let start = Instant::now();
        let outcome = score(&engine, 5).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(outcome.attempts, 2);
        assert_eq!(probe.checks(), 2);
        assert!(elapsed >= Duration::from_millis(1500), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1600), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_on_final_attempt_exhausts_without_reprobe() {
        let provider = ScriptedProvider::new(|_| {
            Err(ProviderError::Network("connection refused".to_string()))
        });
        let probe = ScriptedProbe::new(&[true]);
        let engine = engine(provider.clone(), probe.clone());

        let start = Instant::now();
        let result = score(&engine, 2).await;
        let elapsed = start.elapsed();

        match result {
            Err(RetryError::ExhaustedRetries {
                attempts: 2,
                last: Some(AttemptError::Provider(ProviderError::Network(_))),
            }) => {}
            other => panic!("Expected ExhaustedRetries, got {:?}", other),
        }
        assert_eq!(provider.calls(), 2);
        // Preflight plus the recheck after the first failure only
        assert_eq!(probe.checks(), 2);
        // One network backoff of 1500ms x 1
        assert!(elapsed >= Duration::from_millis(1500), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1600), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_final_attempt() {
        let provider = ScriptedProvider::new(|_| Ok(CompletionResponse::text("200")));
        let engine = engine(provider.clone(), ScriptedProbe::new(&[true]));

        let start = Instant::now();
        assert!(score(&engine, 2).await.is_err());
        let elapsed = start.elapsed();

        assert_eq!(provider.calls(), 2);
        assert!(elapsed >= Duration::from_millis(1000), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1100), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_reports_generic_failure() {
        let provider = ScriptedProvider::new(|_| Ok(CompletionResponse::text("10")));
        let engine = engine(provider.clone(), ScriptedProbe::new(&[true]));

        let error = score(&engine, 0).await.unwrap_err();
        assert!(matches!(error, RetryError::ExhaustedRetries { attempts: 0, last: None }));
        assert_eq!(error.to_string(), "Failed after multiple attempts");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_usage_is_tracked_across_attempts() {
        let provider = ScriptedProvider::new(|call| match call {
            0 => Err(ProviderError::RateLimited { retry_after: None }),
            _ => Ok(CompletionResponse {
                content: "81".to_string(),
                usage: TokenUsage {
                    prompt_tokens: 400,
                    completion_tokens: 1,
                },
                model: "test".to_string(),
            }),
        });
        let engine = engine(provider, ScriptedProbe::new(&[true]));
        let tracker = UsageTracker::new();

        let outcome = engine
            .request_score_tracked("p", "s", &IntegerScore::PERCENT, 5, Some(&tracker))
            .await
            .unwrap();

        assert_eq!(outcome.value, 81);
        let usage = tracker.snapshot();
        assert_eq!(usage.llm_calls, 1);
        assert_eq!(usage.failed_calls, 1);
        assert_eq!(usage.total_tokens, 401);
    }

    #[test]
    fn test_policy_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(FailureClass::Other, 0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(FailureClass::Other, 3), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(FailureClass::Network, 1), Duration::from_millis(3000));
    }

    #[test]
    fn test_error_messages() {
        let exhausted = RetryError::ExhaustedRetries {
            attempts: 5,
            last: Some(AttemptError::EmptyResponse),
        };
        assert_eq!(
            exhausted.to_string(),
            "Failed after 5 attempts: Provider returned an empty response"
        );
        assert_eq!(RetryError::NoConnectivity.to_string(), "No network connectivity");
    }
}
