//! Application state shared across handlers.

use crate::config::Config;
use crate::eth::EthClient;
use std::sync::atomic::AtomicU64;
use std::time::Instant;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub eth: EthClient,
    pub start_time: Instant,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Connect to the node and build shared state from configuration.
    pub async fn new(config: Config) -> Result<Self, crate::Error> {
        let eth = EthClient::connect(&config).await?;

        Ok(Self {
            eth,
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        })
    }
}
