//! `repairdesk serve` -- HTTP JSON server for repair tickets.
//!
//! Two surfaces share one [`RepairStore`]:
//! - resource routes under `/repairs`, which answer missing records with 404
//! - `POST /graphql`, which takes an operation document and always answers
//!   200 with a `{data}` or `{errors}` envelope
//!
//! Security features:
//! - CORS headers on all responses (permissive)
//! - Per-IP rate limiting (default: 60 req/min, configurable)
//! - Optional API key authentication via REPAIRDESK_API_KEY
//!
//! Endpoints:
//! - GET    /health         - Server status (exempt from auth)
//! - GET    /repairs        - List all repairs
//! - POST   /repairs        - Create a repair
//! - GET    /repairs/{id}   - Read one repair
//! - PATCH  /repairs/{id}   - Partially update a repair (PUT is accepted too)
//! - DELETE /repairs/{id}   - Delete a repair
//! - POST   /graphql        - Operation-document endpoint
//!
//! All responses use Content-Type: application/json.
//!
//! [`RepairStore`]: repairdesk_storage::RepairStore

mod handlers;
mod middleware;
mod operation;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Json, Router};
use repairdesk_storage::{JsonFileStore, MemoryStore, RepairStore};
use tower_http::cors::{Any, CorsLayer};

use self::handlers::{
    handle_create_repair, handle_delete_repair, handle_get_repair, handle_health,
    handle_list_repairs, handle_not_found, handle_update_repair,
};
use self::middleware::{auth_middleware, rate_limit_middleware};
use self::operation::handle_operation;
use self::state::{AppState, RateLimiter};
use crate::config::ServeConfig;

/// Maximum request body size: 1 MB.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Rate limit window duration in seconds (1 minute).
const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Path of the operation-document endpoint.
const OPERATION_PATH: &str = "/graphql";

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

/// Open the store the config asks for.
async fn open_store(
    config: &ServeConfig,
) -> Result<Arc<dyn RepairStore>, Box<dyn std::error::Error>> {
    let store: Arc<dyn RepairStore> = match &config.data_file {
        Some(path) => Arc::new(JsonFileStore::open(path).await?),
        None => {
            tracing::info!("using in-memory repair store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

/// Build the router over the given state.
fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/repairs",
            get(handle_list_repairs).post(handle_create_repair),
        )
        .route(
            "/repairs/{id}",
            get(handle_get_repair)
                .patch(handle_update_repair)
                .put(handle_update_repair)
                .delete(handle_delete_repair),
        )
        .route(OPERATION_PATH, post(handle_operation))
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl+C.
pub async fn start_server(config: ServeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&config).await?;

    if config.api_key.is_some() {
        tracing::info!("API key authentication enabled");
    }
    let state = Arc::new(AppState {
        store,
        rate_limiter: RateLimiter::new(config.rate_limit),
        api_key: config.api_key.clone(),
    });
    tracing::info!(
        rate_limit = state.rate_limiter.max_requests,
        "rate limit: requests per minute per IP"
    );

    let app = build_router(state);

    let addr = SocketAddr::new(config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "repairdesk listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}
