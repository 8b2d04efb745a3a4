//! Resource routes: health and `/repairs` CRUD.
//!
//! Unlike the operation endpoint, these routes report a missing repair as
//! 404 and a bad body as 400.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use repairdesk_storage::{NewRepair, RepairPatch, StorageError};
use serde::de::DeserializeOwned;

use super::json_error;
use super::state::AppState;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// GET /repairs
pub(crate) async fn handle_list_repairs(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list().await {
        Ok(repairs) => (StatusCode::OK, Json(repairs)).into_response(),
        Err(e) => storage_failure(e),
    }
}

/// GET /repairs/{id}
pub(crate) async fn handle_get_repair(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.store.get(id).await {
        Ok(Some(repair)) => (StatusCode::OK, Json(repair)).into_response(),
        Ok(None) => repair_not_found(id),
        Err(e) => storage_failure(e),
    }
}

/// POST /repairs
pub(crate) async fn handle_create_repair(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Response {
    let new: NewRepair = match parse_body(&body) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    match state.store.create(new).await {
        Ok(repair) => {
            tracing::info!(id = repair.id, "created repair");
            (StatusCode::CREATED, Json(repair)).into_response()
        }
        Err(e) => storage_failure(e),
    }
}

/// PATCH or PUT /repairs/{id}
pub(crate) async fn handle_update_repair(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let patch: RepairPatch = match parse_body(&body) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    match state.store.update(id, patch).await {
        Ok(Some(repair)) => (StatusCode::OK, Json(repair)).into_response(),
        Ok(None) => repair_not_found(id),
        Err(e) => storage_failure(e),
    }
}

/// DELETE /repairs/{id}
pub(crate) async fn handle_delete_repair(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.store.delete(id).await {
        Ok(true) => {
            tracing::info!(id, "deleted repair");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => repair_not_found(id),
        Err(e) => storage_failure(e),
    }
}

fn parse_id(raw: &str) -> Result<u64, Response> {
    raw.parse::<u64>().map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            &format!("invalid repair id '{}'", raw),
        )
        .into_response()
    })
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        json_error(
            StatusCode::BAD_REQUEST,
            &format!("invalid request body: {}", e),
        )
        .into_response()
    })
}

fn repair_not_found(id: u64) -> Response {
    json_error(StatusCode::NOT_FOUND, &format!("repair {} not found", id)).into_response()
}

fn storage_failure(e: StorageError) -> Response {
    tracing::error!(error = %e, "repair store failure");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).into_response()
}
