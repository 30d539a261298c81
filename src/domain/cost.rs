//! Cost normalization into USD.
//!
//! Estimates the fee of a reference simple transfer (21 000 gas, the EVM
//! minimal-transfer cost) on each chain and prices it in USD using the
//! chain's native token price. This is a fixed-workload simplification,
//! not a gas estimation model.

use super::metric::{ChainMetric, FeeEstimate, TokenPrices};

/// Gas consumed by a plain value transfer on EVM-style chains.
pub const REFERENCE_TRANSFER_GAS: u64 = 21_000;

/// Smallest-unit per gwei (and gwei per whole native token).
pub const GWEI: f64 = 1_000_000_000.0;

/// Convert a raw smallest-unit gas price to gwei (9 decimal places).
#[allow(clippy::cast_precision_loss)]
pub fn wei_to_gwei(raw: u128) -> f64 {
    raw as f64 / GWEI
}

/// Converts gas prices into comparable USD fee estimates.
#[derive(Debug, Clone, Copy)]
pub struct CostNormalizer {
    /// Units of work charged per estimated transaction.
    gas_units: u64,
}

impl Default for CostNormalizer {
    fn default() -> Self {
        Self::reference_transfer()
    }
}

impl CostNormalizer {
    /// Normalizer for the reference 21 000-gas transfer.
    pub const fn reference_transfer() -> Self {
        Self {
            gas_units: REFERENCE_TRANSFER_GAS,
        }
    }

    pub const fn gas_units(&self) -> u64 {
        self.gas_units
    }

    /// Fee of the reference transaction in gwei.
    #[allow(clippy::cast_precision_loss)]
    pub fn fee_gwei(&self, gas_price_gwei: f64) -> f64 {
        gas_price_gwei * self.gas_units as f64
    }

    /// USD fee for a chain given its gas price and the request's token prices.
    ///
    /// Formula: `gas_price_gwei * gas_units / 1e9 * native_price_usd`.
    /// Returns `Incomparable` and no price when the symbol is unresolved.
    pub fn normalize(
        &self,
        gas_price_gwei: f64,
        native_token_symbol: &str,
        prices: &TokenPrices,
    ) -> (FeeEstimate, Option<f64>) {
        match prices.get(native_token_symbol) {
            Some(price_usd) => {
                let fee_native = self.fee_gwei(gas_price_gwei) / GWEI;
                (FeeEstimate::Comparable(fee_native * price_usd), Some(price_usd))
            }
            None => (FeeEstimate::Incomparable, None),
        }
    }

    /// Fill the fee fields of a freshly collected metric.
    pub fn apply(&self, mut metric: ChainMetric, prices: &TokenPrices) -> ChainMetric {
        let (fee, price) = self.normalize(
            metric.gas_price_gwei_equivalent,
            &metric.descriptor.native_token_symbol,
            prices,
        );
        metric.estimated_fee_gwei = self.fee_gwei(metric.gas_price_gwei_equivalent);
        metric.estimated_fee_usd = fee;
        metric.native_token_price_usd = price;
        metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wei_to_gwei() {
        assert!((wei_to_gwei(30_000_000_000) - 30.0).abs() < 1e-12);
        assert!((wei_to_gwei(1_500_000) - 0.0015).abs() < 1e-12);
        assert!(wei_to_gwei(0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_reference_transfer() {
        let mut prices = TokenPrices::new();
        prices.resolve("ETH", 2000.0);

        let (fee, price) = CostNormalizer::reference_transfer().normalize(20.0, "ETH", &prices);

        // 20 gwei * 21000 = 420000 gwei = 0.00042 ETH = $0.84
        let usd = fee.usd().unwrap();
        assert!((usd - 0.84).abs() < 1e-9, "got {usd}");
        assert_eq!(price, Some(2000.0));
    }

    #[test]
    fn test_normalize_unresolved_is_incomparable() {
        let prices = TokenPrices::all_unresolved(["MATIC"]);
        let (fee, price) = CostNormalizer::default().normalize(50.0, "MATIC", &prices);
        assert_eq!(fee, FeeEstimate::Incomparable);
        assert_eq!(price, None);
    }

    #[test]
    fn test_zero_gas_price_is_free_not_incomparable() {
        let mut prices = TokenPrices::new();
        prices.resolve("ETH", 2000.0);
        let (fee, _) = CostNormalizer::default().normalize(0.0, "ETH", &prices);
        assert_eq!(fee, FeeEstimate::Comparable(0.0));
    }
}
