//! Chat read endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::ChatSnapshot;

/// `GET /chat/state` — Online users and retained messages.
#[utoipa::path(
    get,
    path = "/api/v1/chat/state",
    tag = "Chat",
    summary = "Chat room state",
    responses(
        (status = 200, description = "Chat snapshot", body = ChatSnapshot),
    )
)]
pub async fn get_chat_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.chat.state().await)
}

/// Chat routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/chat/state", get(get_chat_state))
}
