//! HTTP Adapters - Routing API
//!
//! - `server`: axum router, handlers and error mapping
//! - `dto`: response wire types with presentation rounding

pub mod dto;
pub mod server;

pub use server::{AppState, HttpServer};
