//! Request correlation and optional API-key auth.

use axum::extract::Request;
use axum::http::header::HeaderMap;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::OnceLock;
use subtle::ConstantTimeEq;

/// Request correlation ID, extractable from `Request::extensions()`.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// API key loaded once from `RELAYER_API_KEY`. `None` = dev mode, no auth.
static API_KEY: OnceLock<Option<String>> = OnceLock::new();

fn expected_api_key() -> &'static Option<String> {
    API_KEY.get_or_init(|| {
        std::env::var("RELAYER_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
    })
}

fn provided_api_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return Some(key);
    }
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Gate the trade endpoint behind `X-Api-Key` / `Authorization: Bearer`.
/// Constant-time comparison; skipped entirely when no key is configured.
pub async fn api_key_auth(request: Request, next: Next) -> Response {
    let Some(expected) = expected_api_key() else {
        return next.run(request).await;
    };

    let authorized = provided_api_key(request.headers())
        .map(|key| {
            key.len() == expected.len()
                && bool::from(key.as_bytes().ct_eq(expected.as_bytes()))
        })
        .unwrap_or(false);

    if authorized {
        next.run(request).await
    } else {
        let body = serde_json::json!({
            "success": false,
            "error": "Unauthorized: invalid or missing API key"
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Take the caller's `x-request-id` or mint one, stash it in the request
/// extensions for the handlers, and echo it on the response.
pub async fn inject_request_id(mut request: Request, next: Next) -> Response {
    let request_id = match request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
    {
        Some(id) => id.to_string(),
        None => {
            use rand::Rng;
            format!("trade-{:016x}", rand::thread_rng().gen::<u64>())
        }
    };

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provided_key_prefers_x_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("abc"));
        headers.insert("authorization", HeaderValue::from_static("Bearer xyz"));
        assert_eq!(provided_api_key(&headers), Some("abc"));
    }

    #[test]
    fn test_provided_key_falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer xyz"));
        assert_eq!(provided_api_key(&headers), Some("xyz"));
    }

    #[test]
    fn test_no_credentials() {
        assert_eq!(provided_api_key(&HeaderMap::new()), None);
    }
}
