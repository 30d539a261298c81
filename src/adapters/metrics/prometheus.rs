//! Prometheus Metrics Registry - Routing Observability
//!
//! Tracks route outcomes, per-chain collection failures, unresolved
//! token prices, last observed gas prices and end-to-end route latency.
//! Rendered in text exposition format on `/metrics`.

use std::time::Duration;

use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use tracing::warn;

use crate::domain::error::{CollectionFailure, RoutingError};
use crate::domain::ranking::Preference;
use crate::ports::metrics_sink::RoutingMetricsSink;

/// Centralized Prometheus metrics for the router.
///
/// All metrics follow the naming convention `nexus_router_*`.
pub struct RoutingMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Route requests by preference and outcome code.
    pub routes_total: IntCounterVec,
    /// Route latency histogram (seconds).
    pub route_latency_seconds: HistogramVec,
    /// Collection failures by chain and failure kind.
    pub collection_failures: IntCounterVec,
    /// Unresolved token prices by symbol.
    pub prices_unresolved: IntCounterVec,
    /// Last observed gas price per chain (gwei).
    pub gas_price_gwei: GaugeVec,
}

impl RoutingMetrics {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let routes_total = IntCounterVec::new(
            Opts::new("nexus_router_routes_total", "Routing requests by outcome"),
            &["preference", "outcome"],
        )?;

        let route_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "nexus_router_route_latency_seconds",
                "End-to-end routing latency in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["preference"],
        )?;

        let collection_failures = IntCounterVec::new(
            Opts::new(
                "nexus_router_collection_failures_total",
                "Per-chain metric collection failures",
            ),
            &["chain", "kind"],
        )?;

        let prices_unresolved = IntCounterVec::new(
            Opts::new(
                "nexus_router_prices_unresolved_total",
                "Token prices that could not be resolved",
            ),
            &["symbol"],
        )?;

        let gas_price_gwei = GaugeVec::new(
            Opts::new(
                "nexus_router_gas_price_gwei",
                "Last observed gas price in gwei",
            ),
            &["chain"],
        )?;

        // Register all metrics
        registry.register(Box::new(routes_total.clone()))?;
        registry.register(Box::new(route_latency_seconds.clone()))?;
        registry.register(Box::new(collection_failures.clone()))?;
        registry.register(Box::new(prices_unresolved.clone()))?;
        registry.register(Box::new(gas_price_gwei.clone()))?;

        Ok(Self {
            registry,
            routes_total,
            route_latency_seconds,
            collection_failures,
            prices_unresolved,
            gas_price_gwei,
        })
    }

    /// Render all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl RoutingMetricsSink for RoutingMetrics {
    /// Count a finished route call.
    fn record_route(
        &self,
        preference: Preference,
        outcome: Result<(), &RoutingError>,
        elapsed: Duration,
    ) {
        let code = outcome.err().map_or("ok", RoutingError::code);
        self.routes_total
            .with_label_values(&[preference.as_str(), code])
            .inc();
        self.route_latency_seconds
            .with_label_values(&[preference.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    fn record_collection_failure(&self, failure: &CollectionFailure) {
        self.collection_failures
            .with_label_values(&[failure.chain(), failure.kind()])
            .inc();
    }

    fn record_unresolved_price(&self, symbol: &str) {
        self.prices_unresolved.with_label_values(&[symbol]).inc();
    }

    fn observe_gas_price(&self, chain: &str, gwei: f64) {
        self.gas_price_gwei.with_label_values(&[chain]).set(gwei);
    }
}
