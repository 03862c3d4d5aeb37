//! Resilience patterns for vitality-runtime.
//!
//! This module provides:
//! - Retry with linear backoff and connectivity checks
//! - Token usage accounting across attempts

mod retry;
mod usage;

pub use retry::{AttemptError, FailureClass, RetryEngine, RetryError, RetryOutcome, RetryPolicy};
pub use usage::{LlmUsage, UsageTracker};
