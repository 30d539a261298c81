//! Gas Source Port - Per-chain Gas Price Interface
//!
//! Abstracts the node endpoint of every candidate chain. EVM chains are
//! served by alloy HTTP providers; any other chain family can plug in
//! here as an opaque source of a raw smallest-unit gas price.

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single gas price query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
  /// Transport-level failure (connection refused, DNS, TLS).
  #[error("endpoint unreachable: {0}")]
  Unreachable(String),
  /// No answer within the allotted time.
  #[error("request timed out after {0} ms")]
  Timeout(u64),
  /// The node answered with an error or an unparseable payload.
  #[error("protocol error: {0}")]
  Protocol(String),
}

/// Source of live gas prices keyed by registry chain id.
#[async_trait]
pub trait GasPriceSource: Send + Sync + 'static {
  /// Whether an endpoint is configured and connected for the chain.
  fn has_endpoint(&self, chain_id: &str) -> bool;

  /// Current gas price in the chain's smallest native unit.
  async fn gas_price_wei(&self, chain_id: &str) -> Result<u128, RpcError>;

  /// Number of chains with a usable endpoint.
  fn connected_count(&self) -> usize;
}
