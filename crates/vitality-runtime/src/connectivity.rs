//! Network reachability probes.
//!
//! The retry engine probes once before the first attempt and again after
//! every network-class failure.

use async_trait::async_trait;
use std::sync::Arc;

use crate::providers::LlmProvider;

/// Answers "can we reach the completion endpoint right now?".
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_reachable(&self) -> bool;
}

/// Probe that always reports the network as reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeOnline;

#[async_trait]
impl ConnectivityProbe for AssumeOnline {
    async fn is_reachable(&self) -> bool {
        true
    }
}

/// Probe that always reports the network as unreachable.
///
/// Forces every metric onto the fallback path without any provider calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

#[async_trait]
impl ConnectivityProbe for Offline {
    async fn is_reachable(&self) -> bool {
        false
    }
}

/// Probe backed by the provider's own health check.
pub struct ProviderHealthProbe {
    provider: Arc<dyn LlmProvider>,
}

impl ProviderHealthProbe {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ConnectivityProbe for ProviderHealthProbe {
    async fn is_reachable(&self) -> bool {
        let reachable = self.provider.health_check().await;
        if !reachable {
            tracing::debug!(provider = self.provider.name(), "Provider health check failed");
        }
        reachable
    }
}
