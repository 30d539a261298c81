//! EVM RPC Provider - alloy-rs 0.9 Connection Management
//!
//! One HTTP provider per EVM chain. The chain id reported by the node
//! is checked against the catalog at startup so a misconfigured URL
//! (e.g. a Polygon endpoint under `ETHEREUM_RPC_URL`) is caught before
//! it can produce wrong prices.
//!
//! `on_http()` returns a transport-specific provider; `boxed()` erases
//! the transport so every chain shares one concrete provider type.

use std::time::Duration;

use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::transports::BoxTransport;
use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::domain::chain::ChainDescriptor;

/// Connected RPC provider for a single EVM chain.
#[derive(Clone)]
pub struct EvmProvider {
    /// The alloy HTTP provider (transport-erased).
    provider: RootProvider<BoxTransport>,
    /// Registry chain id, for diagnostics.
    chain: String,
}

impl EvmProvider {
    /// Connect to `rpc_url` and validate the EIP-155 chain id.
    ///
    /// The URL itself comes from the environment and is never logged.
    #[instrument(skip(rpc_url, descriptor), fields(chain = %descriptor.id))]
    pub async fn connect(
        descriptor: &ChainDescriptor,
        rpc_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let expected = descriptor
            .evm_chain_id
            .with_context(|| format!("{} is not an EVM chain", descriptor.id))?;

        let provider = ProviderBuilder::new()
            .on_http(rpc_url.parse().context("Invalid RPC URL")?)
            .boxed();

        let chain_id = tokio::time::timeout(timeout, provider.get_chain_id())
            .await
            .context("Timed out querying chain ID")?
            .context("Failed to query chain ID")?;

        anyhow::ensure!(
            chain_id == expected,
            "Expected {} (chain_id={expected}), got {chain_id}",
            descriptor.display_name
        );

        info!(chain_id, "Connected to RPC");

        Ok(Self {
            provider,
            chain: descriptor.id.clone(),
        })
    }

    /// Current gas price in wei.
    pub async fn gas_price(&self) -> alloy::transports::TransportResult<u128> {
        self.provider.get_gas_price().await
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }
}
