//! Auction round data: status, bids, the live round, and history entries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{Identity, Lot};

/// Lifecycle state of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    /// No lot open; before the first round.
    Waiting,
    /// A lot is open for bids and the countdown is running.
    Active,
    /// Countdown reached zero or the round was forced closed.
    Ended,
}

/// An accepted bid. Immutable once accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Bid {
    /// Bid amount in the smallest currency unit.
    pub amount: u64,
    /// Who placed the bid.
    #[schema(value_type = String)]
    pub bidder: Identity,
    /// When the bid was accepted.
    pub timestamp: DateTime<Utc>,
}

/// The live (or most recent) auction round.
///
/// Exactly one exists at a time and it is replaced wholesale when the next
/// round starts. Only [`super::AuctionMachine`] mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuctionRound {
    /// 1-based round counter; 0 before the first round.
    pub round: u64,
    /// Lot being auctioned, `None` before the first round.
    pub item: Option<Lot>,
    /// Current high bid, if any.
    pub current_bid: Option<Bid>,
    /// Seconds left on the countdown.
    pub time_remaining: u32,
    /// Round status.
    pub status: AuctionStatus,
    /// Number of bids accepted this round.
    pub bid_count: u32,
    /// When the round started.
    pub start_time: Option<DateTime<Utc>>,
}

impl AuctionRound {
    /// The idle round the machine starts with.
    #[must_use]
    pub fn waiting() -> Self {
        Self {
            round: 0,
            item: None,
            current_bid: None,
            time_remaining: 0,
            status: AuctionStatus::Waiting,
            bid_count: 0,
            start_time: None,
        }
    }

    /// Returns `true` if the round is accepting bids.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AuctionStatus::Active && self.item.is_some()
    }
}

impl Default for AuctionRound {
    fn default() -> Self {
        Self::waiting()
    }
}

/// Record of a concluded round that had a winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HistoryEntry {
    /// Lot display name.
    pub name: String,
    /// Winning bid amount.
    pub final_price: u64,
    /// Winning bidder.
    #[schema(value_type = String)]
    pub winner: Identity,
}
