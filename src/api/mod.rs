//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; system endpoints at the
//! root. Writes happen over the WebSocket sessions in [`crate::ws`], except
//! the force-end admin action.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "gavel-gateway",
        description = "Live auction house, chat room and shared notes over WebSocket, with a read-only REST view."
    ),
    paths(
        handlers::system::health_handler,
        handlers::system::lots_handler,
        handlers::auction::get_state,
        handlers::auction::get_history,
        handlers::auction::get_stats,
        handlers::auction::force_end,
        handlers::chat::get_chat_state,
        handlers::notes::list_notes,
    ),
    tags(
        (name = "System", description = "Health and catalog"),
        (name = "Auction", description = "Auction rounds and history"),
        (name = "Chat", description = "Chat room"),
        (name = "Notes", description = "Shared notes"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
