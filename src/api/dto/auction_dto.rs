//! Auction-related DTOs for stats and admin endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AuctionRound, AuctionStatus, HistoryEntry};

/// Response body for `GET /api/v1/auction/stats`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuctionStatsResponse {
    /// Current round number (0 before the first round).
    pub round: u64,
    /// Current round status.
    pub status: AuctionStatus,
    /// Seconds left in the current round.
    pub time_remaining: u32,
    /// Registered auction participants.
    pub active_users: usize,
    /// Smallest acceptable bid, if a round is active.
    pub minimum_bid: Option<u64>,
    /// Lots sold so far.
    pub lots_sold: usize,
    /// Sum of all final prices.
    pub total_sales: u64,
}

impl AuctionStatsResponse {
    /// Aggregates the stats view from service snapshots.
    #[must_use]
    pub fn from_parts(
        round: &AuctionRound,
        history: &[HistoryEntry],
        active_users: usize,
        minimum_bid: Option<u64>,
    ) -> Self {
        Self {
            round: round.round,
            status: round.status,
            time_remaining: round.time_remaining,
            active_users,
            minimum_bid,
            lots_sold: history.len(),
            total_sales: history
                .iter()
                .fold(0u64, |acc, h| acc.saturating_add(h.final_price)),
        }
    }
}

/// Response body for `POST /api/v1/auction/end`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ForceEndResponse {
    /// Confirmation message.
    pub message: String,
    /// Round state after ending.
    pub state: AuctionRound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Identity;

    #[test]
    fn stats_sum_final_prices() {
        let history = [
            HistoryEntry {
                name: "Alpha".to_string(),
                final_price: 2000,
                winner: Identity::new("b"),
            },
            HistoryEntry {
                name: "Beta".to_string(),
                final_price: 7500,
                winner: Identity::new("a"),
            },
        ];
        let stats = AuctionStatsResponse::from_parts(&AuctionRound::waiting(), &history, 3, None);
        assert_eq!(stats.lots_sold, 2);
        assert_eq!(stats.total_sales, 9500);
        assert_eq!(stats.status, AuctionStatus::Waiting);
        assert_eq!(stats.active_users, 3);
    }
}
