//! # gavel-gateway
//!
//! Live auction house, chat room and shared-notes server over WebSocket,
//! with a read-only REST view.
//!
//! Participants never receive pushes. Every state change is turned into a
//! [`domain::Notification`] and queued per participant; clients drain their
//! queue with a poll command.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Sessions (ws/)          /ws/auction  /ws/chat  /ws/notes
//!     │
//!     ├── AuctionService · ChatService · NotesService (service/)
//!     │       └── round timers (tokio tasks, abortable)
//!     │
//!     ├── AuctionMachine · ChatRoom · NotesBoard (domain/)
//!     └── Broadcaster → RecipientRegistry → DeliveryQueue (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;

use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the full application: REST routes, WebSocket endpoints and the
/// shared middleware stack.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(api::build_router())
        .merge(ws::handler::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}
