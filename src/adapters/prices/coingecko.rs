//! CoinGecko Price Source - `/simple/price` REST Adapter
//!
//! One GET per batch: `ids=a,b,c&vs_currencies=usd`. The public API is
//! aggressively rate limited, so outbound calls pass through a local
//! `governor` quota first; exhausting it, or receiving HTTP 429, is
//! reported as `RateLimited` instead of retrying inside the request.

use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{Quota, RateLimiter as GovernorLimiter};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::PriceConfig;
use crate::ports::price_source::{PriceSource, PriceSourceError};

/// Header carrying a CoinGecko demo API key.
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Upstream error bodies are cut to this many characters.
const MAX_ERROR_BODY_CHARS: usize = 200;

type DirectLimiter = GovernorLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// CoinGecko market-data client.
pub struct CoinGeckoSource {
    /// Underlying HTTP client.
    http: Client,
    /// API base URL (no trailing slash).
    base_url: String,
    /// Quote currency, e.g. "usd".
    vs_currency: String,
    /// Optional demo/pro API key.
    api_key: Option<String>,
    /// Local outbound quota.
    limiter: DirectLimiter,
    /// Client timeout, reported on `Timeout` errors.
    timeout_ms: u64,
}

impl CoinGeckoSource {
    /// Create a client from the `[prices]` config section.
    ///
    /// The API key, if any, is read from the env var named in config.
    pub fn new(config: &PriceConfig, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(2)
            .build()
            .context("Failed to build HTTP client")?;

        let per_minute =
            NonZeroU32::new(config.max_requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let limiter = GovernorLimiter::direct(Quota::per_minute(per_minute));

        let api_key = config
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty());

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            vs_currency: config.vs_currency.to_ascii_lowercase(),
            api_key,
            limiter,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    #[instrument(skip(self, ids), fields(ids = ids.len()))]
    async fn get_prices(
        &self,
        ids: &BTreeSet<String>,
    ) -> Result<HashMap<String, f64>, PriceSourceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        if self.limiter.check().is_err() {
            warn!("Local CoinGecko quota exhausted");
            return Err(PriceSourceError::RateLimited);
        }

        let joined = ids.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        let url = format!("{}/simple/price", self.base_url);

        let mut request = self
            .http
            .get(&url)
            .query(&[("ids", joined.as_str()), ("vs_currencies", self.vs_currency.as_str())]);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PriceSourceError::Timeout(self.timeout_ms)
            } else {
                PriceSourceError::Unreachable(e.to_string())
            }
        })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => return Err(PriceSourceError::RateLimited),
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(PriceSourceError::Protocol(format!(
                    "HTTP {status}: {}",
                    truncate_body(&body)
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| PriceSourceError::Unreachable(e.to_string()))?;

        let prices = parse_simple_price(&body, &self.vs_currency)?;
        debug!(resolved = prices.len(), "CoinGecko prices fetched");
        Ok(prices)
    }
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Parse a `/simple/price` body: `{"ethereum": {"usd": 3012.4}, ...}`.
///
/// Entries without a numeric quote in `vs_currency` are skipped.
fn parse_simple_price(
    body: &str,
    vs_currency: &str,
) -> Result<HashMap<String, f64>, PriceSourceError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| PriceSourceError::Protocol(format!("malformed payload: {e}")))?;

    let entries = root
        .as_object()
        .ok_or_else(|| PriceSourceError::Protocol("payload is not an object".to_string()))?;

    Ok(entries
        .iter()
        .filter_map(|(id, quotes)| {
            quotes
                .get(vs_currency)
                .and_then(Value::as_f64)
                .map(|price| (id.clone(), price))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_parse_simple_price() {
        let body = r#"{"ethereum":{"usd":3012.45},"binancecoin":{"usd":590},"matic-network":{}}"#;
        let prices = parse_simple_price(body, "usd").unwrap();

        assert_eq!(prices.len(), 2);
        assert!((prices["ethereum"] - 3012.45).abs() < 1e-9);
        assert!((prices["binancecoin"] - 590.0).abs() < 1e-9);
        assert!(!prices.contains_key("matic-network"));
    }

    #[test]
    fn test_parse_malformed_payload() {
        assert!(matches!(
            parse_simple_price("<html>", "usd"),
            Err(PriceSourceError::Protocol(_))
        ));
        assert!(matches!(
            parse_simple_price("[1,2]", "usd"),
            Err(PriceSourceError::Protocol(_))
        ));
    }

    #[test]
    fn test_error_body_is_truncated() {
        let short = "quota exceeded";
        assert_eq!(truncate_body(short), short);

        let long = "é".repeat(5_000);
        let cut = truncate_body(&long);
        assert_eq!(cut.chars().count(), MAX_ERROR_BODY_CHARS + 3);
        assert!(cut.ends_with("..."));

        let exact = "x".repeat(MAX_ERROR_BODY_CHARS);
        assert_eq!(truncate_body(&exact), exact);
    }

    #[tokio::test]
    async fn test_local_quota_reports_rate_limited() {
        let config = PriceConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            vs_currency: "usd".to_string(),
            max_requests_per_minute: 1,
            api_key_env: None,
            token_ids: BTreeMap::new(),
        };
        let source = CoinGeckoSource::new(&config, Duration::from_millis(200)).unwrap();
        let ids = BTreeSet::from(["ethereum".to_string()]);

        // First call consumes the quota (and fails to connect), second is throttled locally.
        let _ = source.get_prices(&ids).await;
        assert_eq!(
            source.get_prices(&ids).await,
            Err(PriceSourceError::RateLimited)
        );
    }
}
