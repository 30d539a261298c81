//! Chain Metrics Collector - Live Gas Price per Chain
//!
//! Collects the live gas price for one chain and pairs it with the
//! chain's static properties. Each call is bounded by a timeout and
//! reports failure as a value, so one dead endpoint never affects
//! collection for another chain.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::domain::chain::ChainDescriptor;
use crate::domain::cost::wei_to_gwei;
use crate::domain::error::CollectionFailure;
use crate::domain::metric::{ChainMetric, FeeEstimate};
use crate::ports::gas_source::{GasPriceSource, RpcError};

/// Per-chain gas price collector.
pub struct ChainMetricsCollector {
  /// Node endpoints for every chain.
  source: Arc<dyn GasPriceSource>,
  /// Upper bound for one gas price query.
  timeout: Duration,
}

impl ChainMetricsCollector {
  pub fn new(source: Arc<dyn GasPriceSource>, timeout: Duration) -> Self {
    Self { source, timeout }
  }

  /// Shared gas source (for readiness checks).
  pub fn source(&self) -> &Arc<dyn GasPriceSource> {
    &self.source
  }

  /// Collect live metrics for `descriptor`.
  ///
  /// The returned metric carries no USD estimate yet; fee fields are
  /// filled by the cost normalizer.
  ///
  /// # Errors
  /// - `EndpointUnavailable` when no endpoint is configured or it is unreachable
  /// - `MetricFetchError` on timeout, protocol error or invalid value
  #[instrument(skip(self, descriptor), fields(chain = %descriptor.id))]
  pub async fn collect(
    &self,
    descriptor: Arc<ChainDescriptor>,
  ) -> Result<ChainMetric, CollectionFailure> {
    let chain = descriptor.id.clone();

    if !self.source.has_endpoint(&chain) {
      return Err(CollectionFailure::EndpointUnavailable { chain });
    }

    let raw = match tokio::time::timeout(self.timeout, self.source.gas_price_wei(&chain)).await {
      Ok(Ok(raw)) => raw,
      Ok(Err(RpcError::Unreachable(_))) => {
        return Err(CollectionFailure::EndpointUnavailable { chain });
      }
      Ok(Err(e)) => {
        return Err(CollectionFailure::MetricFetchError {
          chain,
          cause: e.to_string(),
        });
      }
      Err(_) => {
        let elapsed = RpcError::Timeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX));
        return Err(CollectionFailure::MetricFetchError {
          chain,
          cause: elapsed.to_string(),
        });
      }
    };

    let gwei = wei_to_gwei(raw);
    if !gwei.is_finite() {
      return Err(CollectionFailure::MetricFetchError {
        chain,
        cause: format!("gas price {raw} is not representable in gwei"),
      });
    }

    debug!(gas_wei = %raw, gas_gwei = gwei, "Gas price collected");

    Ok(ChainMetric {
      descriptor,
      gas_price_native_unit: raw,
      gas_price_gwei_equivalent: gwei,
      estimated_fee_gwei: 0.0,
      estimated_fee_usd: FeeEstimate::Incomparable,
      native_token_price_usd: None,
    })
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use async_trait::async_trait;

  use super::*;

  /// Gas source answering from a fixed table; `None` entries hang forever.
  struct TableSource(HashMap<String, Option<Result<u128, RpcError>>>);

  #[async_trait]
  impl GasPriceSource for TableSource {
    fn has_endpoint(&self, chain_id: &str) -> bool {
      self.0.contains_key(chain_id)
    }

    async fn gas_price_wei(&self, chain_id: &str) -> Result<u128, RpcError> {
      match self.0.get(chain_id).cloned().flatten() {
        Some(result) => result,
        None => std::future::pending().await,
      }
    }

    fn connected_count(&self) -> usize {
      self.0.len()
    }
  }

  fn descriptor(id: &str) -> Arc<ChainDescriptor> {
    Arc::new(ChainDescriptor {
      id: id.to_string(),
      display_name: id.to_string(),
      native_token_symbol: "ETH".to_string(),
      avg_block_time_seconds: 2.0,
      explorer_url: String::new(),
      evm_chain_id: Some(1),
    })
  }

  fn collector(entries: Vec<(&str, Option<Result<u128, RpcError>>)>) -> ChainMetricsCollector {
    let table = entries
      .into_iter()
      .map(|(k, v)| (k.to_string(), v))
      .collect();
    ChainMetricsCollector::new(Arc::new(TableSource(table)), Duration::from_secs(3))
  }

  #[tokio::test]
  async fn test_collects_and_converts_to_gwei() {
    let c = collector(vec![("ethereum", Some(Ok(25_000_000_000)))]);
    let metric = c.collect(descriptor("ethereum")).await.unwrap();
    assert_eq!(metric.gas_price_native_unit, 25_000_000_000);
    assert!((metric.gas_price_gwei_equivalent - 25.0).abs() < 1e-12);
    assert_eq!(metric.estimated_fee_usd, FeeEstimate::Incomparable);
  }

  #[tokio::test]
  async fn test_missing_endpoint() {
    let c = collector(vec![]);
    let err = c.collect(descriptor("solana")).await.unwrap_err();
    assert_eq!(
      err,
      CollectionFailure::EndpointUnavailable {
        chain: "solana".to_string()
      }
    );
  }

  #[tokio::test]
  async fn test_unreachable_maps_to_endpoint_unavailable() {
    let c = collector(vec![(
      "bsc",
      Some(Err(RpcError::Unreachable("connection refused".to_string()))),
    )]);
    let err = c.collect(descriptor("bsc")).await.unwrap_err();
    assert_eq!(err.kind(), "endpoint_unavailable");
  }

  #[tokio::test]
  async fn test_protocol_error_maps_to_fetch_error() {
    let c = collector(vec![(
      "polygon",
      Some(Err(RpcError::Protocol("bad response".to_string()))),
    )]);
    let err = c.collect(descriptor("polygon")).await.unwrap_err();
    assert!(matches!(err, CollectionFailure::MetricFetchError { ref cause, .. } if cause.contains("bad response")));
  }

  #[tokio::test(start_paused = true)]
  async fn test_hung_endpoint_times_out() {
    let c = collector(vec![("avalanche", None)]);
    let err = c.collect(descriptor("avalanche")).await.unwrap_err();
    assert!(matches!(err, CollectionFailure::MetricFetchError { ref cause, .. } if cause.contains("timed out")));
  }
}
