//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the router's workflows.
//!
//! Use cases:
//! - `PriceOracleClient`: Batched, failure-tolerant token pricing
//! - `ChainMetricsCollector`: Isolated per-chain gas collection
//! - `RoutingService`: Fan-out, normalization, ranking, explanation

pub mod metrics_collector;
pub mod price_oracle;
pub mod router;

pub use metrics_collector::ChainMetricsCollector;
pub use price_oracle::PriceOracleClient;
pub use router::{RoutingService, FALLBACK_EXPLANATION};
