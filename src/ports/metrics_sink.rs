//! Metrics Sink Port - Routing Observability Interface
//!
//! Recording calls made by the routing pipeline. Implementations must
//! not block; they run inline on the request path.

use std::time::Duration;

use crate::domain::error::{CollectionFailure, RoutingError};
use crate::domain::ranking::Preference;

/// Receiver for routing counters and gauges.
pub trait RoutingMetricsSink: Send + Sync + 'static {
  /// Count a finished route call with its outcome and latency.
  fn record_route(
    &self,
    preference: Preference,
    outcome: Result<(), &RoutingError>,
    elapsed: Duration,
  );

  /// Count one chain that dropped out of a comparison.
  fn record_collection_failure(&self, failure: &CollectionFailure);

  fn record_unresolved_price(&self, symbol: &str);

  /// Last gas price observed for `chain`, in gwei.
  fn observe_gas_price(&self, chain: &str, gwei: f64);
}
