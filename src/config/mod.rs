//! Configuration Module - TOML-based Router Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! The chain catalog, market-data id table and all timeouts live here.
//! Secrets (RPC URLs, API keys) are never stored in the file: the file
//! names the environment variables that hold them.

pub mod loader;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::chain::ChainDescriptor;

/// Top-level router configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the service begins accepting requests.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Service identity and HTTP binding.
  pub service: ServiceConfig,
  /// Per-call timeouts for the collection fan-out.
  #[serde(default)]
  pub collection: CollectionConfig,
  /// Market-data provider settings.
  pub prices: PriceConfig,
  /// Explanation collaborator settings.
  #[serde(default)]
  pub explanation: ExplanationConfig,
  /// Metrics and monitoring.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// Candidate chains, in ranking order.
  pub chains: Vec<ChainConfig>,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// HTTP bind address for the routing API.
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
}

/// Timeouts applied to every outbound call of a routing request.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
  /// Per-chain gas price query timeout (milliseconds).
  #[serde(default = "default_chain_timeout")]
  pub chain_timeout_ms: u64,
  /// Batched price fetch timeout (milliseconds).
  #[serde(default = "default_price_timeout")]
  pub price_timeout_ms: u64,
  /// Explanation generation timeout (milliseconds).
  #[serde(default = "default_explanation_timeout")]
  pub explanation_timeout_ms: u64,
  /// Chain id verification timeout at startup (milliseconds).
  #[serde(default = "default_connect_timeout")]
  pub connect_timeout_ms: u64,
}

impl Default for CollectionConfig {
  fn default() -> Self {
    Self {
      chain_timeout_ms: default_chain_timeout(),
      price_timeout_ms: default_price_timeout(),
      explanation_timeout_ms: default_explanation_timeout(),
      connect_timeout_ms: default_connect_timeout(),
    }
  }
}

impl CollectionConfig {
  pub const fn chain_timeout(&self) -> Duration {
    Duration::from_millis(self.chain_timeout_ms)
  }

  pub const fn price_timeout(&self) -> Duration {
    Duration::from_millis(self.price_timeout_ms)
  }

  pub const fn explanation_timeout(&self) -> Duration {
    Duration::from_millis(self.explanation_timeout_ms)
  }

  pub const fn connect_timeout(&self) -> Duration {
    Duration::from_millis(self.connect_timeout_ms)
  }
}

/// Market-data provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceConfig {
  /// Provider REST base URL.
  #[serde(default = "default_prices_url")]
  pub base_url: String,
  /// Quote currency requested from the provider.
  #[serde(default = "default_vs_currency")]
  pub vs_currency: String,
  /// Outbound request budget per minute.
  #[serde(default = "default_prices_rpm")]
  pub max_requests_per_minute: u32,
  /// Env var holding an optional provider API key.
  pub api_key_env: Option<String>,
  /// Native token symbol → provider asset id.
  pub token_ids: BTreeMap<String, String>,
}

/// Explanation collaborator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplanationConfig {
  /// Disable to always return the fallback text.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Env var holding the API key.
  #[serde(default = "default_explanation_key_env")]
  pub api_key_env: String,
  /// Generative model name.
  #[serde(default = "default_explanation_model")]
  pub model: String,
  /// API base URL.
  #[serde(default = "default_explanation_url")]
  pub base_url: String,
}

impl Default for ExplanationConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      api_key_env: default_explanation_key_env(),
      model: default_explanation_model(),
      base_url: default_explanation_url(),
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Expose Prometheus metrics on `/metrics`.
  #[serde(default = "default_true")]
  pub enabled: bool,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self { enabled: true }
  }
}

/// One candidate chain: static descriptor plus where to find its RPC URL.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
  /// Static properties.
  #[serde(flatten)]
  pub descriptor: ChainDescriptor,
  /// Env var holding the chain's RPC URL.
  pub rpc_url_env: String,
}

impl ChainConfig {
  /// RPC URL from the environment, if set and non-empty.
  pub fn rpc_url(&self) -> Option<String> {
    std::env::var(&self.rpc_url_env)
      .ok()
      .filter(|url| !url.trim().is_empty())
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_bind_address() -> String {
  "0.0.0.0:8000".to_string()
}

fn default_true() -> bool {
  true
}

const fn default_chain_timeout() -> u64 {
  5_000
}

const fn default_price_timeout() -> u64 {
  5_000
}

const fn default_explanation_timeout() -> u64 {
  10_000
}

const fn default_connect_timeout() -> u64 {
  5_000
}

fn default_prices_url() -> String {
  "https://api.coingecko.com/api/v3".to_string()
}

fn default_vs_currency() -> String {
  "usd".to_string()
}

const fn default_prices_rpm() -> u32 {
  30
}

fn default_explanation_key_env() -> String {
  "GEMINI_API_KEY".to_string()
}

fn default_explanation_model() -> String {
  "gemini-2.0-flash".to_string()
}

fn default_explanation_url() -> String {
  "https://generativelanguage.googleapis.com/v1beta".to_string()
}
