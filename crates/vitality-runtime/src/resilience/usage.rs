//! Token usage accounting for a scoring run.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::providers::TokenUsage;

/// Accumulated LLM usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Total tokens used
    pub total_tokens: u32,

    /// Prompt/input tokens
    pub prompt_tokens: u32,

    /// Completion/output tokens
    pub completion_tokens: u32,

    /// Provider calls that returned a response
    pub llm_calls: u32,

    /// Provider calls that failed before returning a response
    pub failed_calls: u32,
}

impl LlmUsage {
    /// Add token usage from a provider response.
    pub fn add(&mut self, usage: &TokenUsage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(usage.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(usage.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(usage.total());
        self.llm_calls = self.llm_calls.saturating_add(1);
    }
}

/// Shared usage accumulator.
///
/// One tracker lives for one scoring run; requests in flight at the same
/// time record into it concurrently.
#[derive(Debug, Default)]
pub struct UsageTracker {
    usage: RwLock<LlmUsage>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a provider response.
    pub fn record(&self, usage: &TokenUsage) {
        self.usage.write().add(usage);
    }

    /// Record a provider call that produced no response.
    pub fn record_failure(&self) {
        let mut usage = self.usage.write();
        usage.failed_calls = usage.failed_calls.saturating_add(1);
    }

    /// Get current usage.
    pub fn snapshot(&self) -> LlmUsage {
        self.usage.read().clone()
    }
}
