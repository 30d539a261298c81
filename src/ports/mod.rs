//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `GasPriceSource`: Live gas price per chain (RPC)
//! - `PriceSource`: Batched USD token prices (market data)
//! - `Explainer`: Natural-language rationale for a decision
//! - `RoutingMetricsSink`: Route outcome and collection counters

pub mod explainer;
pub mod gas_source;
pub mod metrics_sink;
pub mod price_source;

pub use explainer::{ExplainError, Explainer};
pub use gas_source::{GasPriceSource, RpcError};
pub use metrics_sink::RoutingMetricsSink;
pub use price_source::{PriceSource, PriceSourceError};
