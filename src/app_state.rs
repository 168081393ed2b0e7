//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::{
    AuctionMachine, Broadcaster, Catalog, ChatRoom, NotesBoard, RecipientRegistry,
};
use crate::service::{AuctionService, ChatService, NotesService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
///
/// Each service has its own [`RecipientRegistry`], so auction, chat and
/// notes identities never see each other's notifications.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Auction house: rounds, bids, timers.
    pub auction: Arc<AuctionService>,
    /// Chat room.
    pub chat: Arc<ChatService>,
    /// Shared notes.
    pub notes: Arc<NotesService>,
}

impl AppState {
    /// Wires every service from the configuration and lot catalog.
    ///
    /// Does not start the auction; see [`AuctionService::launch`].
    #[must_use]
    pub fn new(config: &GatewayConfig, catalog: Catalog) -> Self {
        let auction_registry = Arc::new(RecipientRegistry::new(config.delivery_queue_capacity));
        let chat_registry = Arc::new(RecipientRegistry::new(config.delivery_queue_capacity));
        let notes_registry = Arc::new(RecipientRegistry::new(config.notes_queue_capacity));

        let machine = AuctionMachine::new(config.auction.clone(), catalog);
        Self {
            auction: Arc::new(AuctionService::new(
                machine,
                Broadcaster::new(auction_registry),
            )),
            chat: Arc::new(ChatService::new(
                ChatRoom::new(config.chat_history_limit),
                Broadcaster::new(chat_registry),
                config.chat_recent_on_join,
            )),
            notes: Arc::new(NotesService::new(
                NotesBoard::new(),
                Broadcaster::new(notes_registry),
            )),
        }
    }
}
