//! Metrics Adapters - Prometheus Observability
//!
//! - `prometheus`: Routing counters, gauges and latency histograms

pub mod prometheus;

pub use self::prometheus::RoutingMetrics;
