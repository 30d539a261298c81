//! Routing error taxonomy.
//!
//! `CollectionFailure` never leaves a per-chain task: the coordinator
//! turns it into the chain's absence. `RoutingError` is what callers of
//! `route` see, one variant per distinguishable outcome.

use thiserror::Error;

/// Why metrics for a single chain could not be collected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionFailure {
    /// No endpoint configured for the chain, or the node refused the connection.
    #[error("RPC endpoint for {chain} is not configured or unreachable")]
    EndpointUnavailable { chain: String },

    /// The gas price query or its conversion failed.
    #[error("failed to fetch metrics for {chain}: {cause}")]
    MetricFetchError { chain: String, cause: String },
}

impl CollectionFailure {
    /// Chain the failure belongs to.
    pub fn chain(&self) -> &str {
        match self {
            Self::EndpointUnavailable { chain } | Self::MetricFetchError { chain, .. } => chain,
        }
    }

    /// Short label for metrics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EndpointUnavailable { .. } => "endpoint_unavailable",
            Self::MetricFetchError { .. } => "metric_fetch_error",
        }
    }
}

/// Failure of a whole routing request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The requested preference is not `cheapest` or `fastest`.
    #[error("invalid user preference '{0}', choose 'cheapest' or 'fastest'")]
    InvalidPreference(String),

    /// Request fields failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The chain is not in the registry.
    #[error("chain '{0}' not supported")]
    UnsupportedChain(String),

    /// The chain catalog is malformed.
    #[error("invalid chain registry: {0}")]
    InvalidRegistry(String),

    /// Metric collection failed for every candidate chain.
    #[error("could not fetch metrics for any supported chain")]
    NoViableChains,

    /// Chains were collected but none has a resolvable USD fee.
    #[error("no chains available for cost comparison (token prices missing)")]
    NoComparableChains,

    /// Single-chain inspection failed.
    #[error(transparent)]
    Collection(#[from] CollectionFailure),
}

impl RoutingError {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidPreference(_) => "invalid_preference",
            Self::InvalidRequest(_) => "invalid_request",
            Self::UnsupportedChain(_) => "unsupported_chain",
            Self::InvalidRegistry(_) => "invalid_registry",
            Self::NoViableChains => "no_viable_chains",
            Self::NoComparableChains => "no_comparable_chains",
            Self::Collection(CollectionFailure::EndpointUnavailable { .. }) => {
                "endpoint_unavailable"
            }
            Self::Collection(CollectionFailure::MetricFetchError { .. }) => "metric_fetch_error",
        }
    }

    /// Whether the caller, not the system, is at fault.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPreference(_) | Self::InvalidRequest(_) | Self::UnsupportedChain(_)
        )
    }
}
