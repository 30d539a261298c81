//! Chain Adapters - EVM Node Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider construction with chain id validation
//! - Live gas price queries for the routing collector

pub mod gas;
pub mod provider;

pub use gas::AlloyGasSource;
pub use provider::EvmProvider;
