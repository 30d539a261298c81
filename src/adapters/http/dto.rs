//! Wire types for the routing API.
//!
//! Presentation rounding happens here only: gwei to 2 dp, USD to 4 dp,
//! incomparable fees as `"N/A"`. The domain keeps full precision.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::metric::{ChainMetric, FeeEstimate};
use crate::domain::routing::{RoutingDecision, RoutingRequest};

/// USD amount or the literal `"N/A"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UsdAmount {
    Amount(f64),
    Unavailable(&'static str),
}

impl From<FeeEstimate> for UsdAmount {
    fn from(fee: FeeEstimate) -> Self {
        match fee {
            FeeEstimate::Comparable(usd) => Self::Amount(round_to(usd, 4)),
            FeeEstimate::Incomparable => Self::Unavailable("N/A"),
        }
    }
}

/// `POST /route` response.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub request_id: Uuid,
    pub request: RoutingRequest,
    pub recommendation: Recommendation,
    pub all_chains_metrics: Vec<ChainSummary>,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct Recommendation {
    pub chain: String,
    pub chain_id: String,
    pub reason: String,
    pub details: RecommendationDetails,
    pub ai_explanation: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationDetails {
    pub estimated_gas_fee_gwei: f64,
    pub estimated_gas_fee_usd: UsdAmount,
    pub estimated_time_seconds: f64,
    pub native_token: String,
    pub current_gas_price_gwei: f64,
    pub native_token_price_usd: Option<f64>,
    pub explorer_url: String,
}

/// One row of the comparison set.
#[derive(Debug, Serialize)]
pub struct ChainSummary {
    pub chain: String,
    pub chain_id: String,
    pub estimated_gas_fee_gwei: f64,
    pub estimated_fee_usd: UsdAmount,
    pub avg_block_time_seconds: f64,
}

impl From<&ChainMetric> for ChainSummary {
    fn from(m: &ChainMetric) -> Self {
        Self {
            chain: m.display_name().to_string(),
            chain_id: m.chain_id().to_string(),
            estimated_gas_fee_gwei: round_to(m.estimated_fee_gwei, 2),
            estimated_fee_usd: m.estimated_fee_usd.into(),
            avg_block_time_seconds: m.avg_block_time_seconds(),
        }
    }
}

impl RouteResponse {
    pub fn new(request: RoutingRequest, decision: RoutingDecision) -> Self {
        let chosen = &decision.chosen;
        let recommendation = Recommendation {
            chain: chosen.display_name().to_string(),
            chain_id: chosen.chain_id().to_string(),
            reason: decision.reason,
            details: RecommendationDetails {
                estimated_gas_fee_gwei: round_to(chosen.estimated_fee_gwei, 2),
                estimated_gas_fee_usd: chosen.estimated_fee_usd.into(),
                estimated_time_seconds: chosen.avg_block_time_seconds(),
                native_token: chosen.descriptor.native_token_symbol.clone(),
                current_gas_price_gwei: round_to(chosen.gas_price_gwei_equivalent, 2),
                native_token_price_usd: chosen.native_token_price_usd,
                explorer_url: chosen.descriptor.explorer_url.clone(),
            },
            ai_explanation: decision.explanation,
        };

        Self {
            request_id: decision.request_id,
            request,
            recommendation,
            all_chains_metrics: decision.metrics.iter().map(ChainSummary::from).collect(),
            decided_at: decision.decided_at,
        }
    }
}

/// `GET /chain_metrics/{chain}` response.
#[derive(Debug, Serialize)]
pub struct ChainMetricsResponse {
    pub chain: String,
    pub chain_id: String,
    pub native_token_symbol: String,
    pub gas_price_wei: u128,
    pub gas_price_gwei: f64,
    pub avg_block_time_seconds: f64,
    pub explorer_url: String,
}

impl From<&ChainMetric> for ChainMetricsResponse {
    fn from(m: &ChainMetric) -> Self {
        Self {
            chain: m.display_name().to_string(),
            chain_id: m.chain_id().to_string(),
            native_token_symbol: m.descriptor.native_token_symbol.clone(),
            gas_price_wei: m.gas_price_native_unit,
            gas_price_gwei: round_to(m.gas_price_gwei_equivalent, 2),
            avg_block_time_seconds: m.avg_block_time_seconds(),
            explorer_url: m.descriptor.explorer_url.clone(),
        }
    }
}

/// Error body: stable code plus human-readable detail.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_amount_serialization() {
        let amount: UsdAmount = FeeEstimate::Comparable(0.123_456).into();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "0.1235");

        let na: UsdAmount = FeeEstimate::Incomparable.into();
        assert_eq!(serde_json::to_string(&na).unwrap(), r#""N/A""#);
    }

    #[test]
    fn test_round_to() {
        assert!((round_to(30.456, 2) - 30.46).abs() < 1e-12);
        assert!((round_to(0.000_049, 4) - 0.0).abs() < 1e-12);
    }
}
