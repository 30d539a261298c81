//! Price Source Port - Market Data Interface
//!
//! Batched USD price lookup keyed by the market-data provider's own
//! asset identifiers (e.g. CoinGecko ids), not by ticker symbols.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a whole price batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceSourceError {
  /// Transport-level failure.
  #[error("price source unreachable: {0}")]
  Unreachable(String),
  /// No answer within the allotted time.
  #[error("price request timed out after {0} ms")]
  Timeout(u64),
  /// Local or upstream rate limit hit.
  #[error("price source rate limited")]
  RateLimited,
  /// Non-success status or malformed payload.
  #[error("price source protocol error: {0}")]
  Protocol(String),
}

/// External market-data provider.
#[async_trait]
pub trait PriceSource: Send + Sync + 'static {
  /// Fetch USD prices for a set of provider ids in one call.
  ///
  /// Ids the provider does not know are simply absent from the result.
  async fn get_prices(
    &self,
    ids: &BTreeSet<String>,
  ) -> Result<HashMap<String, f64>, PriceSourceError>;
}
