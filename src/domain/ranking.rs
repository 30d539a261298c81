//! Chain selection under a user preference.
//!
//! Selection is a pure function of the ordered metric set. Ties go to
//! the first chain in registry order, so repeated calls on unchanged
//! input always pick the same chain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::RoutingError;
use super::metric::ChainMetric;

/// What the user wants to optimize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    /// Lowest USD fee among chains with a resolvable price.
    Cheapest,
    /// Shortest nominal block time.
    Fastest,
}

impl Preference {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cheapest => "cheapest",
            Self::Fastest => "fastest",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preference {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cheapest" => Ok(Self::Cheapest),
            "fastest" => Ok(Self::Fastest),
            _ => Err(RoutingError::InvalidPreference(s.to_string())),
        }
    }
}

/// Stateless selector over collected chain metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingEngine;

impl RankingEngine {
    pub const fn new() -> Self {
        Self
    }

    /// Pick the best chain for `preference`.
    ///
    /// # Errors
    /// - `NoViableChains` if `metrics` is empty
    /// - `NoComparableChains` if `preference` is `Cheapest` and no chain has a USD fee
    pub fn select<'a>(
        &self,
        metrics: &'a [ChainMetric],
        preference: Preference,
    ) -> Result<&'a ChainMetric, RoutingError> {
        if metrics.is_empty() {
            return Err(RoutingError::NoViableChains);
        }

        match preference {
            Preference::Cheapest => first_minimum(metrics.iter().filter_map(|m| {
                m.estimated_fee_usd
                    .usd()
                    .filter(|usd| usd.is_finite())
                    .map(|usd| (m, usd))
            }))
            .ok_or(RoutingError::NoComparableChains),
            Preference::Fastest => {
                first_minimum(metrics.iter().map(|m| (m, m.avg_block_time_seconds())))
                    .ok_or(RoutingError::NoViableChains)
            }
        }
    }
}

/// Minimum by key; on equal keys the earliest item wins.
fn first_minimum<'a, I>(candidates: I) -> Option<&'a ChainMetric>
where
    I: Iterator<Item = (&'a ChainMetric, f64)>,
{
    let mut best: Option<(&ChainMetric, f64)> = None;
    for (metric, key) in candidates {
        match best {
            Some((_, best_key)) if key >= best_key => {}
            _ => best = Some((metric, key)),
        }
    }
    best.map(|(metric, _)| metric)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::chain::ChainDescriptor;
    use crate::domain::metric::FeeEstimate;

    fn metric(id: &str, fee: FeeEstimate, block_time: f64) -> ChainMetric {
        ChainMetric {
            descriptor: Arc::new(ChainDescriptor {
                id: id.to_string(),
                display_name: id.to_uppercase(),
                native_token_symbol: "ETH".to_string(),
                avg_block_time_seconds: block_time,
                explorer_url: String::new(),
                evm_chain_id: None,
            }),
            gas_price_native_unit: 1,
            gas_price_gwei_equivalent: 1.0,
            estimated_fee_gwei: 21_000.0,
            estimated_fee_usd: fee,
            native_token_price_usd: fee.usd().map(|_| 2000.0),
        }
    }

    #[test]
    fn test_parse_preference() {
        assert_eq!("cheapest".parse::<Preference>().unwrap(), Preference::Cheapest);
        assert_eq!(" Fastest ".parse::<Preference>().unwrap(), Preference::Fastest);
        assert_eq!(
            "fast".parse::<Preference>(),
            Err(RoutingError::InvalidPreference("fast".to_string()))
        );
    }

    #[test]
    fn test_cheapest_and_fastest_pick_different_chains() {
        let metrics = vec![
            metric("a", FeeEstimate::Comparable(0.05), 2.0),
            metric("b", FeeEstimate::Comparable(0.02), 13.0),
        ];
        let engine = RankingEngine::new();

        assert_eq!(engine.select(&metrics, Preference::Cheapest).unwrap().chain_id(), "b");
        assert_eq!(engine.select(&metrics, Preference::Fastest).unwrap().chain_id(), "a");
    }

    #[test]
    fn test_cheapest_skips_incomparable_fastest_does_not() {
        let metrics = vec![
            metric("a", FeeEstimate::Comparable(0.10), 2.0),
            metric("b", FeeEstimate::Comparable(0.03), 13.0),
            metric("c", FeeEstimate::Incomparable, 0.4),
        ];
        let engine = RankingEngine::new();

        assert_eq!(engine.select(&metrics, Preference::Cheapest).unwrap().chain_id(), "b");
        assert_eq!(engine.select(&metrics, Preference::Fastest).unwrap().chain_id(), "c");
    }

    #[test]
    fn test_ties_go_to_first_in_order() {
        let metrics = vec![
            metric("first", FeeEstimate::Comparable(0.01), 2.0),
            metric("second", FeeEstimate::Comparable(0.01), 2.0),
        ];
        let engine = RankingEngine::new();

        assert_eq!(engine.select(&metrics, Preference::Cheapest).unwrap().chain_id(), "first");
        assert_eq!(engine.select(&metrics, Preference::Fastest).unwrap().chain_id(), "first");
    }

    #[test]
    fn test_empty_input_is_no_viable_chains() {
        let engine = RankingEngine::new();
        assert_eq!(
            engine.select(&[], Preference::Fastest),
            Err(RoutingError::NoViableChains)
        );
        assert_eq!(
            engine.select(&[], Preference::Cheapest),
            Err(RoutingError::NoViableChains)
        );
    }

    #[test]
    fn test_all_incomparable_is_no_comparable_chains() {
        let metrics = vec![
            metric("a", FeeEstimate::Incomparable, 2.0),
            metric("b", FeeEstimate::Incomparable, 3.0),
        ];
        assert_eq!(
            RankingEngine::new().select(&metrics, Preference::Cheapest),
            Err(RoutingError::NoComparableChains)
        );
    }
}
