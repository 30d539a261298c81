//! Gas Source - Live Gas Prices for Every Connected EVM Chain
//!
//! Builds one `EvmProvider` per catalog chain whose RPC URL is set and
//! whose node reports the expected chain id. Chains without a usable
//! endpoint (including every non-EVM chain) are simply absent, and the
//! collector reports them as unavailable on each request.

use std::collections::HashMap;
use std::time::Duration;

use alloy::transports::{RpcError as TransportRpcError, TransportErrorKind};
use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::provider::EvmProvider;
use crate::config::ChainConfig;
use crate::ports::gas_source::{GasPriceSource, RpcError};

/// `GasPriceSource` backed by alloy HTTP providers.
pub struct AlloyGasSource {
    /// Registry chain id → connected provider.
    providers: HashMap<String, EvmProvider>,
}

impl AlloyGasSource {
    /// Connect to every configured EVM chain concurrently.
    ///
    /// Connection problems are logged and leave the chain without an
    /// endpoint; they never abort startup.
    #[instrument(skip_all)]
    pub async fn connect_all(chains: &[ChainConfig], timeout: Duration) -> Self {
        let attempts = chains.iter().map(|chain| async move {
            let descriptor = &chain.descriptor;

            if !descriptor.is_evm() {
                info!(
                    chain = %descriptor.id,
                    "Non-EVM chain, no gas source attached"
                );
                return None;
            }

            let Some(url) = chain.rpc_url() else {
                warn!(
                    chain = %descriptor.id,
                    env = %chain.rpc_url_env,
                    "RPC URL not set, chain will be skipped"
                );
                return None;
            };

            match EvmProvider::connect(descriptor, &url, timeout).await {
                Ok(provider) => Some((descriptor.id.clone(), provider)),
                Err(e) => {
                    warn!(
                        chain = %descriptor.id,
                        error = %e,
                        "Could not connect to RPC, chain will be skipped"
                    );
                    None
                }
            }
        });

        let providers: HashMap<_, _> = join_all(attempts).await.into_iter().flatten().collect();

        info!(
            connected = providers.len(),
            configured = chains.len(),
            "Gas sources ready"
        );

        Self { providers }
    }

    /// Build from already-connected providers.
    pub fn from_providers(providers: impl IntoIterator<Item = EvmProvider>) -> Self {
        Self {
            providers: providers
                .into_iter()
                .map(|p| (p.chain().to_string(), p))
                .collect(),
        }
    }
}

#[async_trait]
impl GasPriceSource for AlloyGasSource {
    fn has_endpoint(&self, chain_id: &str) -> bool {
        self.providers.contains_key(chain_id)
    }

    async fn gas_price_wei(&self, chain_id: &str) -> Result<u128, RpcError> {
        let provider = self
            .providers
            .get(chain_id)
            .ok_or_else(|| RpcError::Unreachable(format!("no provider for {chain_id}")))?;

        let wei = provider.gas_price().await.map_err(classify)?;
        debug!(chain = chain_id, gas_wei = %wei, "Gas price queried");
        Ok(wei)
    }

    fn connected_count(&self) -> usize {
        self.providers.len()
    }
}

/// Transport failures mean the node could not be reached; everything
/// else (error responses, bad payloads) is a protocol error.
fn classify(err: TransportRpcError<TransportErrorKind>) -> RpcError {
    match err {
        TransportRpcError::Transport(kind) => RpcError::Unreachable(kind.to_string()),
        other => RpcError::Protocol(other.to_string()),
    }
}
