//! Market Data Adapters - Token Price Sources
//!
//! - `coingecko`: Batched USD quotes from the CoinGecko REST API

pub mod coingecko;

pub use coingecko::CoinGeckoSource;
