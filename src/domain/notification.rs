//! Notifications queued for delivery to participants.
//!
//! Every state change the gateway wants participants to see is wrapped in a
//! [`Notification`]: a tagged [`NotificationPayload`], a human-readable
//! message, a server timestamp, and a unique id. Notifications are immutable
//! and are cloned into each recipient's delivery queue.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::auction_machine::AuctionEvent;
use super::lot::format_amount;
use super::{Bid, ChatMessage, Identity, Lot, Note};

/// Structural payload of a notification, tagged by `type`.
///
/// The auction, chat, and notes front ends share this closed set; each
/// only produces its own subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationPayload {
    /// Greeting queued for a participant who just joined.
    Welcome {
        /// Who joined.
        username: Identity,
    },
    /// Someone else joined.
    UserJoined {
        /// Who joined.
        username: Identity,
    },
    /// Someone left.
    UserLeft {
        /// Who left.
        username: Identity,
    },
    /// A new auction round opened.
    AuctionStart {
        /// Lot on the block.
        item: Lot,
        /// Countdown length in seconds.
        duration: u32,
    },
    /// Throttled countdown update.
    TimerUpdate {
        /// Seconds left.
        time_remaining: u32,
    },
    /// A late bid extended the round.
    TimerExtended {
        /// Seconds left after the extension.
        time_remaining: u32,
    },
    /// A new high bid.
    BidUpdate {
        /// The accepted bid.
        current_bid: Bid,
        /// Bids accepted so far this round.
        bid_count: u32,
    },
    /// The round closed, with or without a winner.
    AuctionEnd {
        /// Lot that was on the block.
        item: Lot,
        /// Winning bidder.
        winner: Option<Identity>,
        /// Winning amount.
        final_price: Option<u64>,
    },
    /// A chat message was posted.
    Message {
        /// The posted message.
        chat: ChatMessage,
    },
    /// A note was created.
    NoteCreated {
        /// The stored note.
        note: Note,
    },
    /// A note was updated.
    NoteUpdated {
        /// The stored note after the update.
        note: Note,
    },
    /// A note was deleted.
    NoteDeleted {
        /// Id of the deleted note.
        note_id: String,
    },
}

impl NotificationPayload {
    /// Returns the tag as a static string slice.
    #[must_use]
    pub const fn type_str(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::UserJoined { .. } => "user_joined",
            Self::UserLeft { .. } => "user_left",
            Self::AuctionStart { .. } => "auction_start",
            Self::TimerUpdate { .. } => "timer_update",
            Self::TimerExtended { .. } => "timer_extended",
            Self::BidUpdate { .. } => "bid_update",
            Self::AuctionEnd { .. } => "auction_end",
            Self::Message { .. } => "message",
            Self::NoteCreated { .. } => "note_created",
            Self::NoteUpdated { .. } => "note_updated",
            Self::NoteDeleted { .. } => "note_deleted",
        }
    }

    /// Default human-readable message for this payload.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Welcome { username } => format!("Welcome {username}!"),
            Self::UserJoined { username } => format!("{username} joined"),
            Self::UserLeft { username } => format!("{username} left"),
            Self::AuctionStart { item, .. } => {
                format!("NEW AUCTION: {} from {}!", item.name, item.origin)
            }
            Self::TimerUpdate { time_remaining } => format!("{time_remaining} seconds remaining"),
            Self::TimerExtended { time_remaining } => {
                format!("Time extended! {time_remaining} seconds remaining.")
            }
            Self::BidUpdate { current_bid, .. } => format!(
                "{} bid ${}!",
                current_bid.bidder,
                format_amount(current_bid.amount)
            ),
            Self::AuctionEnd {
                winner: Some(winner),
                final_price: Some(price),
                ..
            } => format!("SOLD! Goes to {winner} for ${}!", format_amount(*price)),
            Self::AuctionEnd { .. } => "No bids received. Item will return later.".to_string(),
            Self::Message { chat } => chat.message.clone(),
            Self::NoteCreated { note } => format!("Note created: {}", note.title),
            Self::NoteUpdated { note } => format!("Note updated: {}", note.title),
            Self::NoteDeleted { note_id } => format!("Note deleted: {note_id}"),
        }
    }
}

impl From<AuctionEvent> for NotificationPayload {
    fn from(event: AuctionEvent) -> Self {
        match event {
            AuctionEvent::Started { lot, duration } => Self::AuctionStart {
                item: lot,
                duration,
            },
            AuctionEvent::TimerUpdate { time_remaining } => Self::TimerUpdate { time_remaining },
            AuctionEvent::BidPlaced { bid, bid_count } => Self::BidUpdate {
                current_bid: bid,
                bid_count,
            },
            AuctionEvent::TimerExtended { time_remaining } => {
                Self::TimerExtended { time_remaining }
            }
            AuctionEvent::Ended { lot, winning_bid } => {
                let (winner, final_price) = match winning_bid {
                    Some(bid) => (Some(bid.bidder), Some(bid.amount)),
                    None => (None, None),
                };
                Self::AuctionEnd {
                    item: lot,
                    winner,
                    final_price,
                }
            }
        }
    }
}

/// One deliverable event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Unique notification id.
    pub id: Uuid,
    /// Server-side creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// Human-readable message.
    pub message: String,
    /// Tagged structural payload, flattened into the envelope.
    #[serde(flatten)]
    pub payload: NotificationPayload,
}

impl Notification {
    /// Wraps a payload using its default message.
    #[must_use]
    pub fn new(payload: NotificationPayload) -> Self {
        let message = payload.describe();
        Self::with_message(payload, message)
    }

    /// Wraps a payload with a custom message.
    #[must_use]
    pub fn with_message(payload: NotificationPayload, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            message: message.into(),
            payload,
        }
    }

    /// Returns the payload tag.
    #[must_use]
    pub const fn type_str(&self) -> &'static str {
        self.payload.type_str()
    }
}
