//! # Trade Relayer
//!
//! A minimal relayer for flash-loan trades. Accepts a trade request over
//! HTTP, signs a call to a pre-configured contract with the server-held
//! key, submits it to the node, and waits until the network mines it.
//!
//! ## Quick Start
//! ```bash
//! cargo run --bin trade-relayer
//! ```
//!
//! ## Endpoints
//! - `POST /execute-trade` - Sign and submit a trade, wait for the receipt
//! - `GET /tx/{tx_hash}` - Receipt lookup for a submitted transaction
//! - `GET /health` - Health check with basic metrics
//! - `GET /metrics` - Prometheus metrics

pub mod config;
mod error;
pub mod eth;
mod handlers;
mod metrics;
mod middleware;
mod response;
mod router;
mod schemas;
mod state;

pub use config::Config;
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
