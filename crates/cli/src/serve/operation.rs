//! POST /graphql: the single-endpoint operation interface.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use repairdesk_core::{render_error, DispatchError};

use super::state::AppState;
use super::MAX_BODY_SIZE;

/// Every outcome, including malformed or oversized bodies and unsupported
/// operations, is a 200 carrying a data or errors envelope.
///
/// The body is read here with its own cap instead of through
/// `DefaultBodyLimit`, which would answer an oversized body with a bare 413.
pub(crate) async fn handle_operation(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> impl IntoResponse {
    let envelope = match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(bytes) => repairdesk_core::dispatch(state.store.as_ref(), &bytes).await,
        Err(e) => render_error(&DispatchError::MalformedBody(format!(
            "could not read body (limit {} bytes): {}",
            MAX_BODY_SIZE, e
        ))),
    };
    (StatusCode::OK, Json(envelope))
}
