//! Error types for the relayer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;

/// Relayer error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// RPC communication error.
    Rpc(String),
    /// Transaction error (dropped, encoding failure, etc.).
    Tx(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
            Error::Tx(msg) => write!(f, "transaction error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Every runtime failure surfaces to the caller as a generic 500.
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string()
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
