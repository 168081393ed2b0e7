//! Auction state machine: lot rotation, bid acceptance, countdown, history.
//!
//! [`AuctionMachine`] is synchronous and clock-free: callers pass the
//! current instant in, and every transition returns the typed
//! [`AuctionEvent`]s it produced instead of invoking callbacks. Scheduling
//! (the one-second tick, the end deadline, the inter-round pause) belongs to
//! [`crate::service::AuctionService`], which serializes all calls behind a
//! single lock.
//!
//! ```text
//! Waiting ──start──▶ Active ──deadline / force──▶ Ended ──pause──▶ Active (next lot)
//!                     │  ▲
//!                     └──┘ tick, accepted bid (may extend)
//! ```

use chrono::{DateTime, Utc};

use super::auction_round::{AuctionRound, AuctionStatus, Bid, HistoryEntry};
use super::{Catalog, Identity, Lot};
use crate::error::GatewayError;

/// Numeric rules governing every round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionRules {
    /// Countdown length of a fresh round, in seconds.
    pub round_duration_secs: u32,
    /// Amount a new bid must exceed the current high bid by.
    pub bid_increment: u64,
    /// A bid landing with fewer seconds left than this extends the round.
    pub extension_threshold_secs: u32,
    /// Seconds added by a qualifying late bid.
    pub extension_secs: u32,
    /// Pause between a round ending and the next one starting.
    pub inter_round_delay_secs: u64,
    /// Pause between service start and the first round.
    pub first_round_delay_secs: u64,
    /// Outside the closing window, `timer_update` is emitted on multiples of this.
    pub timer_update_every_secs: u32,
    /// Inside this many final seconds, every tick emits `timer_update`.
    pub closing_window_secs: u32,
    /// Maximum history entries kept; `0` keeps everything.
    pub history_limit: usize,
}

impl Default for AuctionRules {
    fn default() -> Self {
        Self {
            round_duration_secs: 120,
            bid_increment: 1000,
            extension_threshold_secs: 30,
            extension_secs: 30,
            inter_round_delay_secs: 10,
            first_round_delay_secs: 3,
            timer_update_every_secs: 10,
            closing_window_secs: 10,
            history_limit: 0,
        }
    }
}

/// Domain events produced by state transitions, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuctionEvent {
    /// A new round opened.
    Started {
        /// Lot on the block.
        lot: Lot,
        /// Countdown length in seconds.
        duration: u32,
    },
    /// Throttled countdown update.
    TimerUpdate {
        /// Seconds left.
        time_remaining: u32,
    },
    /// A bid became the new high bid.
    BidPlaced {
        /// The accepted bid.
        bid: Bid,
        /// Bids accepted so far this round.
        bid_count: u32,
    },
    /// A late bid pushed the deadline back.
    TimerExtended {
        /// Seconds left after the extension.
        time_remaining: u32,
    },
    /// The round closed.
    Ended {
        /// Lot that was on the block.
        lot: Lot,
        /// Winning bid, or `None` if nobody bid.
        winning_bid: Option<Bid>,
    },
}

/// Result of an accepted bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidReceipt {
    /// The accepted bid, now the high bid.
    pub bid: Bid,
    /// Bids accepted so far this round.
    pub bid_count: u32,
    /// Seconds left after the bid (including any extension).
    pub time_remaining: u32,
    /// Whether the bid triggered the extension rule.
    pub extended: bool,
    /// Events to broadcast, in order.
    pub events: Vec<AuctionEvent>,
}

/// The single auction round plus catalog position and history.
#[derive(Debug)]
pub struct AuctionMachine {
    rules: AuctionRules,
    catalog: Catalog,
    round: AuctionRound,
    history: Vec<HistoryEntry>,
    next_lot_index: u64,
}

impl AuctionMachine {
    /// Creates a machine in the `Waiting` state.
    #[must_use]
    pub fn new(rules: AuctionRules, catalog: Catalog) -> Self {
        Self {
            rules,
            catalog,
            round: AuctionRound::waiting(),
            history: Vec::new(),
            next_lot_index: 0,
        }
    }

    /// Returns the rules in force.
    #[must_use]
    pub fn rules(&self) -> &AuctionRules {
        &self.rules
    }

    /// Returns the lot catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the current round.
    #[must_use]
    pub fn round(&self) -> &AuctionRound {
        &self.round
    }

    /// Returns concluded rounds with a winner, oldest first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Smallest bid the current round would accept, if it is active.
    #[must_use]
    pub fn minimum_bid(&self) -> Option<u64> {
        if !self.round.is_active() {
            return None;
        }
        match (&self.round.current_bid, &self.round.item) {
            (Some(bid), _) => Some(bid.amount.saturating_add(self.rules.bid_increment)),
            (None, Some(lot)) => Some(lot.starting_price),
            (None, None) => None,
        }
    }

    /// Opens a new round with the next lot in the catalog.
    ///
    /// Replaces whatever round was there, active or not.
    pub fn start_round(&mut self, now: DateTime<Utc>) -> Option<AuctionEvent> {
        let lot = self.catalog.lot_for(self.next_lot_index)?.clone();
        self.next_lot_index = self.next_lot_index.wrapping_add(1);

        let duration = self.rules.round_duration_secs;
        self.round = AuctionRound {
            round: self.round.round.saturating_add(1),
            item: Some(lot.clone()),
            current_bid: None,
            time_remaining: duration,
            status: AuctionStatus::Active,
            bid_count: 0,
            start_time: Some(now),
        };

        tracing::info!(
            round = self.round.round,
            lot = %lot.id,
            duration,
            "auction round started"
        );
        Some(AuctionEvent::Started { lot, duration })
    }

    /// Advances the countdown by one second.
    ///
    /// The decrement always happens while active; the returned update is
    /// throttled to multiples of `timer_update_every_secs` and to every
    /// second inside the closing window.
    pub fn tick(&mut self) -> Option<AuctionEvent> {
        if self.round.status != AuctionStatus::Active || self.round.time_remaining == 0 {
            return None;
        }
        self.round.time_remaining -= 1;
        let remaining = self.round.time_remaining;

        let on_cadence = remaining
            .checked_rem(self.rules.timer_update_every_secs)
            .is_none_or(|r| r == 0);
        if on_cadence || remaining <= self.rules.closing_window_secs {
            Some(AuctionEvent::TimerUpdate {
                time_remaining: remaining,
            })
        } else {
            None
        }
    }

    /// Places a bid on the current round.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::NoActiveAuction`] if no round is accepting bids.
    /// - [`GatewayError::NonPositiveBid`] if `amount` is zero.
    /// - [`GatewayError::BidTooLow`] carrying the exact minimum otherwise.
    pub fn place_bid(
        &mut self,
        bidder: Identity,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<BidReceipt, GatewayError> {
        let minimum = self.minimum_bid().ok_or(GatewayError::NoActiveAuction)?;
        if amount == 0 {
            return Err(GatewayError::NonPositiveBid);
        }
        if amount < minimum {
            return Err(GatewayError::BidTooLow { minimum });
        }

        let bid = Bid {
            amount,
            bidder,
            timestamp: now,
        };
        self.round.current_bid = Some(bid.clone());
        self.round.bid_count = self.round.bid_count.saturating_add(1);

        let extended = self.round.time_remaining < self.rules.extension_threshold_secs;
        if extended {
            self.round.time_remaining = self
                .round
                .time_remaining
                .saturating_add(self.rules.extension_secs);
        }

        tracing::info!(
            round = self.round.round,
            amount,
            bidder = %bid.bidder,
            extended,
            time_remaining = self.round.time_remaining,
            "bid accepted"
        );

        let mut events = vec![AuctionEvent::BidPlaced {
            bid: bid.clone(),
            bid_count: self.round.bid_count,
        }];
        if extended {
            events.push(AuctionEvent::TimerExtended {
                time_remaining: self.round.time_remaining,
            });
        }

        Ok(BidReceipt {
            bid,
            bid_count: self.round.bid_count,
            time_remaining: self.round.time_remaining,
            extended,
            events,
        })
    }

    /// Closes the active round, recording a history entry if someone won.
    ///
    /// Returns `None` (and changes nothing) if no round is active.
    pub fn end_round(&mut self) -> Option<AuctionEvent> {
        if self.round.status != AuctionStatus::Active {
            return None;
        }
        self.round.status = AuctionStatus::Ended;
        self.round.time_remaining = 0;

        let lot = self.round.item.clone()?;
        let winning_bid = self.round.current_bid.clone();
        if let Some(bid) = &winning_bid {
            self.history.push(HistoryEntry {
                name: lot.name.clone(),
                final_price: bid.amount,
                winner: bid.bidder.clone(),
            });
            let limit = self.rules.history_limit;
            if limit > 0 && self.history.len() > limit {
                let excess = self.history.len() - limit;
                self.history.drain(..excess);
            }
        }

        tracing::info!(
            round = self.round.round,
            lot = %lot.id,
            winner = winning_bid.as_ref().map(|b| b.bidder.as_str()),
            final_price = winning_bid.as_ref().map(|b| b.amount),
            "auction round ended"
        );
        Some(AuctionEvent::Ended { lot, winning_bid })
    }
}
