//! Chain catalog types.
//!
//! A `ChainDescriptor` carries the fixed properties of one candidate
//! network. The `ChainRegistry` is the ordered, immutable set of all
//! candidates, built once at startup and shared behind an `Arc`.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::RoutingError;

/// Lightweight chain identifier used at the ports boundary (e.g. "ethereum").
pub type ChainId = String;

/// Native token ticker symbol (e.g. "ETH").
pub type TokenSymbol = String;

/// Static properties of a candidate chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDescriptor {
    /// Unique registry key.
    pub id: ChainId,
    /// Human-readable name shown in responses.
    pub display_name: String,
    /// Asset used to pay fees on this chain.
    pub native_token_symbol: TokenSymbol,
    /// Nominal block time in seconds. Always positive.
    pub avg_block_time_seconds: f64,
    /// Block explorer base URL.
    pub explorer_url: String,
    /// EIP-155 chain id for EVM-compatible chains, `None` otherwise.
    #[serde(default)]
    pub evm_chain_id: Option<u64>,
}

impl ChainDescriptor {
    /// Whether the chain speaks the uniform EVM JSON-RPC model.
    pub const fn is_evm(&self) -> bool {
        self.evm_chain_id.is_some()
    }
}

/// Ordered catalog of candidate chains.
///
/// Iteration order is the configuration order and never changes, which
/// is what makes ranking tie-breaks deterministic.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<Arc<ChainDescriptor>>,
}

impl ChainRegistry {
    /// Build a registry, rejecting duplicate ids and invalid properties.
    pub fn new(chains: Vec<ChainDescriptor>) -> Result<Self, RoutingError> {
        let mut seen = HashSet::with_capacity(chains.len());

        for chain in &chains {
            if chain.id.is_empty() {
                return Err(RoutingError::InvalidRegistry(
                    "chain id must not be empty".to_string(),
                ));
            }
            if !seen.insert(chain.id.to_ascii_lowercase()) {
                return Err(RoutingError::InvalidRegistry(format!(
                    "duplicate chain id '{}'",
                    chain.id
                )));
            }
            if !(chain.avg_block_time_seconds.is_finite() && chain.avg_block_time_seconds > 0.0) {
                return Err(RoutingError::InvalidRegistry(format!(
                    "chain '{}' has non-positive block time {}",
                    chain.id, chain.avg_block_time_seconds
                )));
            }
            if chain.native_token_symbol.is_empty() {
                return Err(RoutingError::InvalidRegistry(format!(
                    "chain '{}' has empty native token symbol",
                    chain.id
                )));
            }
        }

        Ok(Self {
            chains: chains.into_iter().map(Arc::new).collect(),
        })
    }

    /// Look up a chain by id, case-insensitively.
    pub fn get(&self, id: &str) -> Option<&Arc<ChainDescriptor>> {
        self.chains.iter().find(|c| c.id.eq_ignore_ascii_case(id))
    }

    /// All chains in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ChainDescriptor>> {
        self.chains.iter()
    }

    /// Native token symbols of every chain, deduplicated, first-seen order.
    pub fn native_symbols(&self) -> Vec<TokenSymbol> {
        let mut seen = HashSet::new();
        self.chains
            .iter()
            .filter(|c| seen.insert(c.native_token_symbol.clone()))
            .map(|c| c.native_token_symbol.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, symbol: &str, block_time: f64) -> ChainDescriptor {
        ChainDescriptor {
            id: id.to_string(),
            display_name: format!("{id} Mainnet"),
            native_token_symbol: symbol.to_string(),
            avg_block_time_seconds: block_time,
            explorer_url: format!("https://{id}.example/"),
            evm_chain_id: Some(1),
        }
    }

    #[test]
    fn test_registry_preserves_order_and_dedups_symbols() {
        let registry = ChainRegistry::new(vec![
            descriptor("ethereum", "ETH", 13.0),
            descriptor("polygon", "MATIC", 2.2),
            descriptor("optimism", "ETH", 0.5),
        ])
        .unwrap();

        let ids: Vec<_> = registry.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ethereum", "polygon", "optimism"]);
        assert_eq!(registry.native_symbols(), vec!["ETH", "MATIC"]);
    }

    #[test]
    fn test_registry_lookup_is_case_insensitive() {
        let registry = ChainRegistry::new(vec![descriptor("polygon", "MATIC", 2.2)]).unwrap();
        assert!(registry.get("Polygon").is_some());
        assert!(registry.get("solana").is_none());
    }

    #[test]
    fn test_registry_rejects_duplicate_ids() {
        let result = ChainRegistry::new(vec![
            descriptor("ethereum", "ETH", 13.0),
            descriptor("ethereum", "ETH", 12.0),
        ]);
        assert!(matches!(result, Err(RoutingError::InvalidRegistry(_))));
    }

    #[test]
    fn test_registry_rejects_ids_differing_only_in_case() {
        let result = ChainRegistry::new(vec![
            descriptor("Ethereum", "ETH", 13.0),
            descriptor("ethereum", "ETH", 12.0),
        ]);
        assert!(matches!(result, Err(RoutingError::InvalidRegistry(_))));
    }

    #[test]
    fn test_registry_rejects_zero_block_time() {
        let result = ChainRegistry::new(vec![descriptor("bsc", "BNB", 0.0)]);
        assert!(matches!(result, Err(RoutingError::InvalidRegistry(_))));
    }
}
