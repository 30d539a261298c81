//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, blockchain RPC, HTTP server).
//! Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `chain`: EVM gas prices via alloy-rs
//! - `prices`: CoinGecko token prices
//! - `explain`: Gemini rationale generation
//! - `http`: axum routing API, probes and metrics endpoint
//! - `metrics`: Prometheus registry

pub mod chain;
pub mod explain;
pub mod http;
pub mod metrics;
pub mod prices;
