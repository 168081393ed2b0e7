//! Auction read endpoints and the force-end admin action.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AuctionStatsResponse, ForceEndResponse};
use crate::app_state::AppState;
use crate::domain::{AuctionRound, HistoryEntry};
use crate::error::{ErrorResponse, GatewayError};

/// `GET /auction/state` — Current round snapshot.
#[utoipa::path(
    get,
    path = "/api/v1/auction/state",
    tag = "Auction",
    summary = "Current round",
    description = "Returns the current round: lot, high bid, seconds left and status.",
    responses(
        (status = 200, description = "Round snapshot", body = AuctionRound),
    )
)]
pub async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.auction.current_state().await)
}

/// `GET /auction/history` — Sold lots, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/auction/history",
    tag = "Auction",
    summary = "Auction history",
    description = "Returns every concluded round that had a winner, oldest first.",
    responses(
        (status = 200, description = "History entries", body = Vec<HistoryEntry>),
    )
)]
pub async fn get_history(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.auction.history().await)
}

/// `GET /auction/stats` — Aggregated auction stats.
#[utoipa::path(
    get,
    path = "/api/v1/auction/stats",
    tag = "Auction",
    summary = "Auction statistics",
    description = "Returns round progress, participant count, minimum bid and sales totals.",
    responses(
        (status = 200, description = "Auction stats", body = AuctionStatsResponse),
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let round = state.auction.current_state().await;
    let history = state.auction.history().await;
    let active_users = state.auction.active_users().await;
    let minimum_bid = state.auction.minimum_bid().await;
    Json(AuctionStatsResponse::from_parts(
        &round,
        &history,
        active_users,
        minimum_bid,
    ))
}

/// `POST /auction/end` — End the active round now.
///
/// # Errors
///
/// Returns [`GatewayError::NoActiveAuction`] if no round is active.
#[utoipa::path(
    post,
    path = "/api/v1/auction/end",
    tag = "Auction",
    summary = "Force-end the round",
    description = "Ends the active round immediately, recording the winner if any. The next round starts after the usual pause.",
    responses(
        (status = 200, description = "Round ended", body = ForceEndResponse),
        (status = 409, description = "No active round", body = ErrorResponse),
    )
)]
pub async fn force_end(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    state.auction.force_end().await?;
    Ok(Json(ForceEndResponse {
        message: "Auction round ended".to_string(),
        state: state.auction.current_state().await,
    }))
}

/// Auction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auction/state", get(get_state))
        .route("/auction/history", get(get_history))
        .route("/auction/stats", get(get_stats))
        .route("/auction/end", post(force_end))
}
