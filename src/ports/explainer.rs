//! Explainer Port - Natural-language Rationale Interface
//!
//! The explainer receives a decision that is already final. Its output
//! is decoration; it has no way to change the chosen chain.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::metric::ChainMetric;
use crate::domain::routing::RoutingRequest;

/// Explanation failure. Always recoverable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplainError {
  /// Collaborator not configured (e.g. missing API key) or not reachable.
  #[error("explanation service unavailable: {0}")]
  Unavailable(String),
  /// Collaborator answered but produced no usable text.
  #[error("explanation generation failed: {0}")]
  GenerationError(String),
}

/// Text-generation collaborator producing a routing rationale.
#[async_trait]
pub trait Explainer: Send + Sync + 'static {
  /// Explain why `chosen` was picked among `metrics`.
  async fn explain(
    &self,
    request: &RoutingRequest,
    chosen: &ChainMetric,
    reason: &str,
    metrics: &[ChainMetric],
  ) -> Result<String, ExplainError>;
}
