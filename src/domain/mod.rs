//! Domain layer - Chain catalog, metrics, cost model and ranking.
//!
//! Pure logic with no I/O (hexagonal architecture inner ring).
//! Everything here is deterministic and testable in isolation.

pub mod chain;
pub mod cost;
pub mod error;
pub mod metric;
pub mod ranking;
pub mod routing;

// Re-export core types for convenience
pub use chain::{ChainDescriptor, ChainId, ChainRegistry, TokenSymbol};
pub use cost::CostNormalizer;
pub use error::{CollectionFailure, RoutingError};
pub use metric::{ChainMetric, FeeEstimate, TokenPrices};
pub use ranking::{Preference, RankingEngine};
pub use routing::{RoutingDecision, RoutingRequest};
