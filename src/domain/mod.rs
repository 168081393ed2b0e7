//! Domain layer: auction state machine, chat and notes state, and the
//! queued delivery system.
//!
//! Leaves first: [`DeliveryQueue`] buffers notifications for one identity,
//! [`RecipientRegistry`] owns one queue per connected [`Identity`],
//! [`Broadcaster`] fans a [`Notification`] out across the registry, and
//! [`AuctionMachine`], [`ChatRoom`] and [`NotesBoard`] hold the shared state
//! whose changes are broadcast.

pub mod auction_machine;
pub mod auction_round;
pub mod broadcaster;
pub mod chat_room;
pub mod delivery_queue;
pub mod identity;
pub mod lot;
pub mod notes_board;
pub mod notification;
pub mod recipient_registry;

pub use auction_machine::{AuctionEvent, AuctionMachine, AuctionRules, BidReceipt};
pub use auction_round::{AuctionRound, AuctionStatus, Bid, HistoryEntry};
pub use broadcaster::Broadcaster;
pub use chat_room::{ChatMessage, ChatRoom, ChatSnapshot};
pub use delivery_queue::DeliveryQueue;
pub use identity::Identity;
pub use lot::{Catalog, Lot, Rarity};
pub use notes_board::{Note, NoteUpdate, NotesBoard, SyncOutcome};
pub use notification::{Notification, NotificationPayload};
pub use recipient_registry::RecipientRegistry;
