//! Data Transfer Objects for REST responses.
//!
//! Domain snapshots ([`crate::domain::AuctionRound`], [`crate::domain::Note`],
//! ...) are serialized as-is; the types here cover aggregated views.

pub mod auction_dto;
pub mod notes_dto;

pub use auction_dto::*;
pub use notes_dto::*;
