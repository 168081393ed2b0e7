//! Service layer: business logic orchestration.
//!
//! Each service owns one piece of shared state behind a mutex and fans
//! changes out through its own [`crate::domain::Broadcaster`]:
//! [`AuctionService`] also drives the round timers, [`ChatService`] keeps the
//! chat room, and [`NotesService`] keeps the shared note set.

pub mod auction_service;
pub mod chat_service;
pub mod notes_service;

pub use auction_service::{AuctionService, JoinAck};
pub use chat_service::{ChatJoinAck, ChatService};
pub use notes_service::NotesService;
