//! WebSocket layer: connection handling, command routing, sessions.
//!
//! Three endpoints share one envelope format and one connection loop:
//! `/ws/auction`, `/ws/chat` and `/ws/notes`. Each socket owns a session
//! that binds it to an identity; closing the socket releases it.

pub mod auction_session;
pub mod chat_session;
pub mod connection;
pub mod handler;
pub mod messages;
pub mod notes_session;
pub mod session;
