//! System endpoints: health check and lot catalog.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::Lot;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    auction_users: usize,
    notes_clients: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp and connection counts.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            auction_users: state.auction.active_users().await,
            notes_clients: state.notes.connected_clients().await,
        }),
    )
}

/// `GET /config/lots` — List the lot catalog.
#[utoipa::path(
    get,
    path = "/config/lots",
    tag = "System",
    summary = "List auction lots",
    description = "Returns every lot in rotation order. Rounds cycle through this list.",
    responses(
        (status = 200, description = "Lot catalog", body = Vec<Lot>),
    )
)]
pub async fn lots_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.auction.catalog().await))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/lots", get(lots_handler))
}
