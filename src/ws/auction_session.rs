//! `/ws/auction` session.

use std::sync::Arc;

use serde_json::json;

use super::connection::{RpcSession, to_payload};
use super::messages::AuctionCommand;
use super::session::SessionBinding;
use crate::domain::Identity;
use crate::error::GatewayError;
use crate::service::AuctionService;

/// One auction participant's connection.
#[derive(Debug)]
pub struct AuctionSession {
    service: Arc<AuctionService>,
    binding: SessionBinding,
}

impl AuctionSession {
    /// Creates an unbound session.
    #[must_use]
    pub fn new(service: Arc<AuctionService>) -> Self {
        Self {
            service,
            binding: SessionBinding::new(),
        }
    }

    async fn place_bid(&self, amount: i64) -> Result<serde_json::Value, GatewayError> {
        let bidder = self.binding.require()?;
        let amount = u64::try_from(amount)
            .ok()
            .filter(|a| *a > 0)
            .ok_or(GatewayError::NonPositiveBid)?;
        let receipt = self.service.place_bid(bidder, amount).await?;
        Ok(json!({
            "message": "Bid placed successfully",
            "current_bid": receipt.bid,
            "bid_count": receipt.bid_count,
            "time_remaining": receipt.time_remaining,
            "extended": receipt.extended,
        }))
    }
}

impl RpcSession for AuctionSession {
    type Command = AuctionCommand;
    const ENDPOINT: &'static str = "auction";

    async fn handle(&mut self, command: AuctionCommand) -> Result<serde_json::Value, GatewayError> {
        match command {
            AuctionCommand::Join { username } => {
                let identity = Identity::parse(&username)?;
                if let Some(previous) = self.binding.bind(identity.clone()) {
                    self.service.leave(&previous).await;
                }
                to_payload(&self.service.join(&identity).await)
            }
            AuctionCommand::PlaceBid { amount } => self.place_bid(amount).await,
            AuctionCommand::GetCurrentState => to_payload(&self.service.current_state().await),
            AuctionCommand::GetHistory => to_payload(&self.service.history().await),
            AuctionCommand::PollMessages => match self.binding.current() {
                Some(identity) => to_payload(&self.service.poll(identity).await),
                None => Ok(json!([])),
            },
        }
    }

    async fn close(mut self) {
        if let Some(identity) = self.binding.release() {
            self.service.leave(&identity).await;
        }
    }
}
