//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;
use crate::domain::chain::ChainRegistry;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    chains = config.chains.len(),
    priced_tokens = config.prices.token_ids.len(),
    chain_timeout_ms = config.collection.chain_timeout_ms,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Build the immutable chain catalog from the configured chains.
pub fn build_registry(config: &AppConfig) -> Result<ChainRegistry> {
  let descriptors = config
    .chains
    .iter()
    .map(|c| c.descriptor.clone())
    .collect();

  ChainRegistry::new(descriptors).context("Invalid chain catalog")
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A non-empty chain catalog with unique ids
/// - Positive block times and timeouts
/// - Usable provider settings
fn validate_config(config: &AppConfig) -> Result<()> {
  // Chain validation
  anyhow::ensure!(
    !config.chains.is_empty(),
    "At least one chain must be configured"
  );

  let mut ids = HashSet::new();
  for (i, chain) in config.chains.iter().enumerate() {
    let d = &chain.descriptor;
    anyhow::ensure!(!d.id.is_empty(), "Chain {} has empty id", i);
    anyhow::ensure!(
      ids.insert(d.id.to_ascii_lowercase()),
      "Chain {} ({}) is defined more than once",
      i,
      d.id
    );
    anyhow::ensure!(
      d.avg_block_time_seconds.is_finite() && d.avg_block_time_seconds > 0.0,
      "Chain {} ({}) avg_block_time_seconds must be positive, got {}",
      i,
      d.id,
      d.avg_block_time_seconds
    );
    anyhow::ensure!(
      !d.native_token_symbol.is_empty(),
      "Chain {} ({}) has empty native_token_symbol",
      i,
      d.id
    );
    anyhow::ensure!(
      !chain.rpc_url_env.is_empty(),
      "Chain {} ({}) has empty rpc_url_env",
      i,
      d.id
    );
  }

  // Timeout validation
  let c = &config.collection;
  anyhow::ensure!(
    c.chain_timeout_ms > 0
      && c.price_timeout_ms > 0
      && c.explanation_timeout_ms > 0
      && c.connect_timeout_ms > 0,
    "Collection timeouts must be positive"
  );

  // Price provider validation
  anyhow::ensure!(
    !config.prices.base_url.is_empty(),
    "Price provider base_url must not be empty"
  );
  anyhow::ensure!(
    config.prices.max_requests_per_minute > 0,
    "prices.max_requests_per_minute must be positive"
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = r#"
[service]
name = "nexus-router-test"

[prices]
[prices.token_ids]
ETH = "ethereum"
MATIC = "matic-network"

[[chains]]
id = "ethereum"
display_name = "Ethereum Mainnet"
native_token_symbol = "ETH"
avg_block_time_seconds = 13.0
explorer_url = "https://etherscan.io/"
evm_chain_id = 1
rpc_url_env = "ETHEREUM_RPC_URL"

[[chains]]
id = "solana"
display_name = "Solana"
native_token_symbol = "SOL"
avg_block_time_seconds = 0.4
explorer_url = "https://solscan.io/"
rpc_url_env = "SOLANA_RPC_URL"
"#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_parse_sample_applies_defaults() {
    let config = parse_config(SAMPLE).unwrap();
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.collection.chain_timeout_ms, 5_000);
    assert_eq!(config.prices.vs_currency, "usd");
    assert_eq!(config.chains[0].descriptor.evm_chain_id, Some(1));
    assert_eq!(config.chains[1].descriptor.evm_chain_id, None);

    let registry = build_registry(&config).unwrap();
    assert_eq!(registry.len(), 2);
  }

  #[test]
  fn test_rejects_duplicate_chain() {
    let doubled = format!(
      "{SAMPLE}\n[[chains]]\nid = \"Ethereum\"\ndisplay_name = \"x\"\nnative_token_symbol = \"ETH\"\navg_block_time_seconds = 1.0\nexplorer_url = \"\"\nrpc_url_env = \"X\"\n"
    );
    assert!(parse_config(&doubled).is_err());
  }

  #[test]
  fn test_rejects_zero_timeout() {
    let zeroed = SAMPLE.replace(
      "[prices]",
      "[collection]\nchain_timeout_ms = 0\n\n[prices]",
    );
    assert!(parse_config(&zeroed).is_err());
  }

  #[test]
  fn test_shipped_config_is_valid() {
    let content = include_str!("../../config.toml");
    let config = parse_config(content).unwrap();
    assert!(build_registry(&config).is_ok());
  }
}
