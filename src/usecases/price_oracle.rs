//! Price Oracle Client - Batched Native Token Pricing
//!
//! Resolves USD prices for a set of ticker symbols with exactly one
//! outbound call per batch. Never fails the caller: anything that cannot
//! be priced comes back unresolved, and a failed batch comes back
//! entirely unresolved.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::domain::metric::TokenPrices;
use crate::ports::price_source::{PriceSource, PriceSourceError};

/// Symbol-keyed facade over a provider-id-keyed `PriceSource`.
pub struct PriceOracleClient {
  /// Market-data provider.
  source: Arc<dyn PriceSource>,
  /// Ticker symbol → provider asset id.
  token_ids: BTreeMap<String, String>,
  /// Upper bound for the batch call.
  timeout: Duration,
}

impl PriceOracleClient {
  /// Create a client with a fixed symbol → provider id table.
  pub fn new(
    source: Arc<dyn PriceSource>,
    token_ids: BTreeMap<String, String>,
    timeout: Duration,
  ) -> Self {
    Self {
      source,
      token_ids,
      timeout,
    }
  }

  /// Fetch USD prices for `symbols`.
  ///
  /// Duplicates are collapsed before the call. Symbols without a
  /// provider id, or missing from the response, resolve to unresolved.
  #[instrument(skip(self, symbols))]
  pub async fn fetch_prices<I, S>(&self, symbols: I) -> TokenPrices
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let symbols: BTreeSet<String> = symbols
      .into_iter()
      .map(|s| s.as_ref().to_string())
      .collect();

    let ids: BTreeSet<String> = symbols
      .iter()
      .filter_map(|s| self.token_ids.get(s).cloned())
      .collect();

    if ids.is_empty() {
      warn!(
        symbols = symbols.len(),
        "No requested token has a market-data id, skipping price fetch"
      );
      return TokenPrices::all_unresolved(symbols);
    }

    let fetched = match tokio::time::timeout(self.timeout, self.source.get_prices(&ids)).await {
      Ok(result) => result,
      Err(_) => Err(PriceSourceError::Timeout(
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
      )),
    };

    let quotes = match fetched {
      Ok(quotes) => quotes,
      Err(e) => {
        warn!(error = %e, ids = ids.len(), "Price batch failed, all tokens unresolved");
        return TokenPrices::all_unresolved(symbols);
      }
    };

    let mut prices = TokenPrices::new();
    for symbol in symbols {
      let quote = self
        .token_ids
        .get(&symbol)
        .and_then(|id| quotes.get(id))
        .copied();

      match quote {
        Some(usd) if usd.is_finite() && usd > 0.0 => {
          debug!(symbol = %symbol, usd, "Token price resolved");
          prices.resolve(symbol, usd);
        }
        _ => {
          warn!(
            symbol = %symbol,
            provider_id = ?self.token_ids.get(&symbol),
            "Could not resolve token price"
          );
          prices.mark_unresolved(symbol);
        }
      }
    }

    prices
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;
  use std::sync::Mutex;

  use async_trait::async_trait;

  use super::*;

  /// Records every batch it receives and replies with a fixed result.
  struct FakeSource {
    reply: Result<HashMap<String, f64>, PriceSourceError>,
    calls: Mutex<Vec<BTreeSet<String>>>,
    delay: Option<Duration>,
  }

  impl FakeSource {
    fn new(reply: Result<HashMap<String, f64>, PriceSourceError>) -> Self {
      Self {
        reply,
        calls: Mutex::new(Vec::new()),
        delay: None,
      }
    }
  }

  #[async_trait]
  impl PriceSource for FakeSource {
    async fn get_prices(
      &self,
      ids: &BTreeSet<String>,
    ) -> Result<HashMap<String, f64>, PriceSourceError> {
      self.calls.lock().unwrap().push(ids.clone());
      if let Some(delay) = self.delay {
        tokio::time::sleep(delay).await;
      }
      self.reply.clone()
    }
  }

  fn table() -> BTreeMap<String, String> {
    BTreeMap::from([
      ("ETH".to_string(), "ethereum".to_string()),
      ("MATIC".to_string(), "matic-network".to_string()),
      ("BNB".to_string(), "binancecoin".to_string()),
    ])
  }

  #[tokio::test]
  async fn test_single_deduplicated_batch() {
    let source = Arc::new(FakeSource::new(Ok(HashMap::from([
      ("ethereum".to_string(), 3000.0),
      ("matic-network".to_string(), 0.5),
    ]))));
    let client = PriceOracleClient::new(source.clone(), table(), Duration::from_secs(1));

    let prices = client.fetch_prices(["ETH", "MATIC", "ETH"]).await;

    let calls = source.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 2);
    assert_eq!(prices.get("ETH"), Some(3000.0));
    assert_eq!(prices.get("MATIC"), Some(0.5));
  }

  #[tokio::test]
  async fn test_partial_response_marks_missing_unresolved() {
    let source = Arc::new(FakeSource::new(Ok(HashMap::from([(
      "ethereum".to_string(),
      3000.0,
    )]))));
    let client = PriceOracleClient::new(source, table(), Duration::from_secs(1));

    let prices = client.fetch_prices(["ETH", "BNB", "DOGE"]).await;

    assert_eq!(prices.get("ETH"), Some(3000.0));
    assert_eq!(prices.get("BNB"), None);
    assert_eq!(prices.get("DOGE"), None);
    assert_eq!(prices.len(), 3);
  }

  #[tokio::test]
  async fn test_batch_failure_is_all_unresolved() {
    let source = Arc::new(FakeSource::new(Err(PriceSourceError::RateLimited)));
    let client = PriceOracleClient::new(source, table(), Duration::from_secs(1));

    let prices = client.fetch_prices(["ETH", "MATIC"]).await;

    assert_eq!(prices.len(), 2);
    assert_eq!(prices.unresolved().count(), 2);
  }

  #[tokio::test]
  async fn test_unknown_symbols_make_no_call() {
    let source = Arc::new(FakeSource::new(Ok(HashMap::new())));
    let client = PriceOracleClient::new(source.clone(), table(), Duration::from_secs(1));

    let prices = client.fetch_prices(["XYZ"]).await;

    assert!(source.calls.lock().unwrap().is_empty());
    assert_eq!(prices.get("XYZ"), None);
  }

  #[tokio::test(start_paused = true)]
  async fn test_slow_source_times_out() {
    let mut fake = FakeSource::new(Ok(HashMap::from([("ethereum".to_string(), 3000.0)])));
    fake.delay = Some(Duration::from_secs(30));
    let client = PriceOracleClient::new(Arc::new(fake), table(), Duration::from_secs(2));

    let prices = client.fetch_prices(["ETH"]).await;

    assert_eq!(prices.get("ETH"), None);
  }
}
