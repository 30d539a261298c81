//! Nexus Router - Library Root
//!
//! Multi-chain transaction router: collects live gas prices, normalizes
//! fees to USD and recommends the cheapest or fastest chain.
//!
//! Re-exports all modules for integration tests and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
