//! Per-request metric records.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::chain::{ChainDescriptor, TokenSymbol};

/// USD fee estimate for one chain.
///
/// `Incomparable` marks a chain whose native token price is unknown; it
/// is reported but never takes part in cost ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "usd", rename_all = "snake_case")]
pub enum FeeEstimate {
    Comparable(f64),
    Incomparable,
}

impl FeeEstimate {
    /// USD amount if comparable.
    pub const fn usd(&self) -> Option<f64> {
        match self {
            Self::Comparable(usd) => Some(*usd),
            Self::Incomparable => None,
        }
    }

    pub const fn is_comparable(&self) -> bool {
        matches!(self, Self::Comparable(_))
    }
}

/// Token prices for a single request: symbol → USD, `None` = unresolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenPrices {
    prices: HashMap<TokenSymbol, Option<f64>>,
}

impl TokenPrices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every symbol unresolved.
    pub fn all_unresolved<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TokenSymbol>,
    {
        Self {
            prices: symbols.into_iter().map(|s| (s.into(), None)).collect(),
        }
    }

    /// Record a resolved price. Non-positive or non-finite values are stored as unresolved.
    pub fn resolve(&mut self, symbol: impl Into<TokenSymbol>, usd: f64) {
        let value = (usd.is_finite() && usd > 0.0).then_some(usd);
        self.prices.insert(symbol.into(), value);
    }

    pub fn mark_unresolved(&mut self, symbol: impl Into<TokenSymbol>) {
        self.prices.insert(symbol.into(), None);
    }

    /// USD price for a symbol; `None` when unresolved or never requested.
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied().flatten()
    }

    /// Symbols present in the map but without a price.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.prices
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Live metrics for one chain within one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainMetric {
    /// Static chain properties.
    pub descriptor: Arc<ChainDescriptor>,
    /// Raw gas price in the chain's smallest unit (wei for EVM chains).
    pub gas_price_native_unit: u128,
    /// Gas price scaled by 10^9.
    pub gas_price_gwei_equivalent: f64,
    /// Fee for the reference transfer, in gwei.
    pub estimated_fee_gwei: f64,
    /// Fee for the reference transfer, in USD.
    pub estimated_fee_usd: FeeEstimate,
    /// Native token price used for the USD estimate.
    pub native_token_price_usd: Option<f64>,
}

impl ChainMetric {
    pub fn chain_id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn display_name(&self) -> &str {
        &self.descriptor.display_name
    }

    pub fn avg_block_time_seconds(&self) -> f64 {
        self.descriptor.avg_block_time_seconds
    }
}
