//! HTTP request handlers.

use crate::eth::{self, MinedTrade};
use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::response::{HealthResponse, TradeResponse, TxStatusResponse};
use crate::schemas::TradeRequest;
use crate::state::AppState;
use crate::Error;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ethers::types::H256;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Health check with basic metrics.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rpc_status = match state.eth.health_check().await {
        Ok(_) => "ok",
        Err(_) => "unavailable",
    };

    Json(HealthResponse {
        status: rpc_status,
        signer_address: format!("{:#x}", state.eth.signer_address()),
        contract_address: format!("{:#x}", state.eth.contract_address()),
        chain_id: state.eth.chain_id(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
        rpc_status,
    })
}

/// Prometheus metrics in text exposition format.
pub async fn metrics() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        METRICS.render(),
    )
}

/// Sign and submit a trade to the configured contract method, blocking
/// until the network mines it. `POST /execute-trade`
pub async fn execute_trade(
    State(state): State<Arc<AppState>>,
    request_parts: Request,
) -> Response {
    let start = std::time::Instant::now();
    METRICS.trades_total.fetch_add(1, Ordering::Relaxed);
    state.request_count.fetch_add(1, Ordering::Relaxed);

    // Extract correlation ID (set by middleware).
    let req_id = request_parts
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();

    let trade = match parse_trade_body(request_parts).await {
        Ok(t) => t,
        Err(e) => {
            METRICS.trades_error.fetch_add(1, Ordering::Relaxed);
            warn!(req_id = %req_id, error = %e, "Invalid JSON body");
            return (
                StatusCode::BAD_REQUEST,
                Json(TradeResponse::err(format!("Invalid JSON body: {e}"), None)),
            )
                .into_response();
        }
    };

    info!(
        req_id = %req_id,
        token_in = %format!("{:#x}", trade.token_in),
        token_out = %format!("{:#x}", trade.token_out),
        amount = %trade.flashloan_amt,
        "Relaying trade"
    );

    let gas = eth::effective_gas(trade.gas_limit, state.config.gas_limit);
    let result = state
        .eth
        .execute_trade(
            trade.token_in,
            trade.token_out,
            trade.flashloan_amt.into(),
            trade.params,
            gas,
        )
        .await;

    match &result {
        Ok(mined) if mined.is_success() => {
            METRICS.trades_success.fetch_add(1, Ordering::Relaxed);
            info!(req_id = %req_id, tx_hash = %format!("{:#x}", mined.tx_hash), "Trade mined");
        }
        Ok(mined) => {
            METRICS.trades_reverted.fetch_add(1, Ordering::Relaxed);
            error!(req_id = %req_id, tx_hash = %format!("{:#x}", mined.tx_hash), "Trade reverted on-chain");
        }
        Err(e) => {
            METRICS.trades_error.fetch_add(1, Ordering::Relaxed);
            error!(req_id = %req_id, error = %e, "Trade execution failed");
        }
    }
    METRICS.record_trade_duration(start);

    trade_outcome_response(result)
}

/// Pull a `TradeRequest` out of the body. Separate from the handler so the
/// rejection path is exercisable without chain state.
async fn parse_trade_body(request: Request) -> Result<TradeRequest, JsonRejection> {
    Json::<TradeRequest>::from_request(request, &())
        .await
        .map(|Json(trade)| trade)
}

/// Map the chain outcome onto the HTTP envelope. A mined-but-reverted
/// trade is a failure that still reports its hash; every other runtime
/// failure passes through the single `Error` boundary.
fn trade_outcome_response(result: Result<MinedTrade, Error>) -> Response {
    match result {
        Ok(mined) if mined.is_success() => {
            let tx_hash = format!("{:#x}", mined.tx_hash);
            let receipt = serde_json::to_value(&mined.receipt).ok();
            (StatusCode::OK, Json(TradeResponse::ok(tx_hash, receipt))).into_response()
        }
        Ok(mined) => {
            let tx_hash = format!("{:#x}", mined.tx_hash);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TradeResponse::err("Transaction reverted", Some(tx_hash))),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Query a submitted transaction's receipt. `GET /tx/{tx_hash}`
pub async fn tx_status(
    State(state): State<Arc<AppState>>,
    Path(tx_hash_str): Path<String>,
) -> (StatusCode, Json<TxStatusResponse>) {
    let tx_hash: H256 = match tx_hash_str.parse() {
        Ok(h) => h,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(TxStatusResponse::err("Invalid tx_hash format")),
            );
        }
    };

    match state.eth.transaction_receipt(tx_hash).await {
        Ok(Some(receipt)) => {
            let hash = format!("{tx_hash:#x}");
            let receipt_json = serde_json::to_value(&receipt).ok();
            let body = if eth::is_reverted(&receipt) {
                TxStatusResponse::reverted(hash, receipt_json)
            } else {
                TxStatusResponse::mined(hash, receipt_json)
            };
            (StatusCode::OK, Json(body))
        }
        // No receipt — not mined yet (or unknown to this node).
        Ok(None) => (
            StatusCode::OK,
            Json(TxStatusResponse::pending(format!("{tx_hash:#x}"))),
        ),
        Err(e) => {
            error!(error = %e, "Receipt query RPC error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TxStatusResponse::err("RPC temporarily unavailable")),
            )
        }
    }
}
