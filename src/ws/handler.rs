//! Axum WebSocket upgrade handlers, one per endpoint.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;
use axum::routing::get;

use super::auction_session::AuctionSession;
use super::chat_session::ChatSession;
use super::connection::run_connection;
use super::notes_session::NotesSession;
use crate::app_state::AppState;

/// `GET /ws/auction` — Upgrade to an auction session.
pub async fn auction_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let session = AuctionSession::new(Arc::clone(&state.auction));
    ws.on_upgrade(move |socket| run_connection(socket, session))
}

/// `GET /ws/chat` — Upgrade to a chat session.
pub async fn chat_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let session = ChatSession::new(Arc::clone(&state.chat));
    ws.on_upgrade(move |socket| run_connection(socket, session))
}

/// `GET /ws/notes` — Upgrade to a notes session.
pub async fn notes_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let session = NotesSession::new(Arc::clone(&state.notes));
    ws.on_upgrade(move |socket| run_connection(socket, session))
}

/// WebSocket routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ws/auction", get(auction_ws_handler))
        .route("/ws/chat", get(chat_ws_handler))
        .route("/ws/notes", get(notes_ws_handler))
}
