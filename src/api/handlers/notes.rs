//! Notes read endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::NotesListResponse;
use crate::app_state::AppState;

/// `GET /notes` — All notes.
#[utoipa::path(
    get,
    path = "/api/v1/notes",
    tag = "Notes",
    summary = "List notes",
    description = "Returns every stored note, oldest first. Writes go through the `/ws/notes` socket.",
    responses(
        (status = 200, description = "Notes", body = NotesListResponse),
    )
)]
pub async fn list_notes(State(state): State<AppState>) -> impl IntoResponse {
    let notes = state.notes.all().await;
    Json(NotesListResponse {
        count: notes.len(),
        connected_clients: state.notes.connected_clients().await,
        notes,
    })
}

/// Notes routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/notes", get(list_notes))
}
