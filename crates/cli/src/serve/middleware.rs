//! Request gates applied before routing: per-client throttling and the
//! optional API key.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::state::AppState;

/// Paths reachable without a key, for load balancer probes.
const OPEN_PATHS: &[&str] = &["/health"];

pub(crate) async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = peer.ip();
    let Err(retry_after) = state.rate_limiter.check(ip).await else {
        return next.run(request).await;
    };

    tracing::warn!(%ip, retry_after, path = %request.uri().path(), "rate limit exceeded");
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(serde_json::json!({
            "error": "rate limit exceeded",
            "retry_after": retry_after,
        })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

/// The key a client presented, from `Authorization: Bearer <key>` or
/// `X-API-Key: <key>`, in that order.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    bearer.or_else(|| headers.get("x-api-key").and_then(|v| v.to_str().ok()))
}

/// Enforces `REPAIRDESK_API_KEY` when one is configured: 401 without a key,
/// 403 with the wrong one.
pub(crate) async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };
    if OPEN_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let verdict = presented_key(request.headers()).map(|key| key == expected);
    match verdict {
        Some(true) => next.run(request).await,
        Some(false) => {
            tracing::warn!(path = %request.uri().path(), "rejected request with wrong API key");
            super::json_error(StatusCode::FORBIDDEN, "invalid API key").into_response()
        }
        None => super::json_error(StatusCode::UNAUTHORIZED, "authentication required")
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_is_preferred() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert("x-api-key", HeaderValue::from_static("xyz"));
        assert_eq!(presented_key(&headers), Some("abc"));
    }

    #[test]
    fn falls_back_to_api_key_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        headers.insert("x-api-key", HeaderValue::from_static("xyz"));
        assert_eq!(presented_key(&headers), Some("xyz"));
    }

    #[test]
    fn no_key_presented() {
        assert_eq!(presented_key(&HeaderMap::new()), None);
    }
}
