//! HTTP router setup.

use crate::handlers;
use crate::middleware;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create(state: Arc<AppState>) -> Router {
    // Only the trade endpoint sits behind the (optional) API key.
    let trade = Router::new()
        .route("/execute-trade", post(handlers::execute_trade))
        .route_layer(axum::middleware::from_fn(middleware::api_key_auth));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/tx/{tx_hash}", get(handlers::tx_status))
        .merge(trade)
        .layer(axum::middleware::from_fn(middleware::inject_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
