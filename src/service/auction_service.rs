//! Auction service: drives the round timers and broadcasts round events.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::{self, Instant};

use crate::domain::{
    AuctionEvent, AuctionMachine, AuctionRound, BidReceipt, Broadcaster, HistoryEntry, Identity,
    Lot, Notification, NotificationPayload,
};
use crate::error::GatewayError;

/// Work a one-shot timer performs when it fires, given its arming epoch.
type TimerJob = fn(Arc<AuctionService>, u64) -> BoxFuture<'static, ()>;

/// A spawned timer task plus the epoch it was armed in.
#[derive(Debug)]
struct ScheduledTask {
    epoch: u64,
    handle: AbortHandle,
}

/// Cancellable timers that belong to the current round.
///
/// A fired timer only acts if its slot still holds its epoch, so a timer
/// that raced with its own cancellation is a no-op.
#[derive(Debug, Default)]
struct RoundTimers {
    tick: Option<ScheduledTask>,
    deadline: Option<ScheduledTask>,
    restart: Option<ScheduledTask>,
    epoch: u64,
}

impl RoundTimers {
    fn next_epoch(&mut self) -> u64 {
        self.epoch = self.epoch.wrapping_add(1);
        self.epoch
    }

    fn cancel(slot: &mut Option<ScheduledTask>) {
        if let Some(task) = slot.take() {
            task.handle.abort();
        }
    }

    /// Takes the slot if it still holds `epoch`, without aborting it.
    ///
    /// Used by a timer task to claim itself.
    fn claim(slot: &mut Option<ScheduledTask>, epoch: u64) -> bool {
        if slot.as_ref().is_some_and(|task| task.epoch == epoch) {
            *slot = None;
            true
        } else {
            false
        }
    }

    fn cancel_all(&mut self) {
        Self::cancel(&mut self.tick);
        Self::cancel(&mut self.deadline);
        Self::cancel(&mut self.restart);
    }
}

#[derive(Debug)]
struct AuctionInner {
    machine: AuctionMachine,
    timers: RoundTimers,
    launched: bool,
}

/// Acknowledgement returned by [`AuctionService::join`].
#[derive(Debug, Clone, Serialize)]
pub struct JoinAck {
    /// Human-readable confirmation.
    pub message: String,
    /// Number of identities registered after the join.
    pub active_users: usize,
    /// Snapshot of the current round.
    pub state: AuctionRound,
}

/// Orchestration layer for the auction house.
///
/// Owns the [`AuctionMachine`] behind one mutex: join, bid, tick, deadline
/// and round start all run inside that critical section, and events are
/// broadcast before it is released so delivery order matches state order.
#[derive(Debug)]
pub struct AuctionService {
    inner: Mutex<AuctionInner>,
    broadcaster: Broadcaster,
}

impl AuctionService {
    /// Creates a new `AuctionService`. No round runs until
    /// [`launch`](Self::launch) or [`start_next_round`](Self::start_next_round).
    #[must_use]
    pub fn new(machine: AuctionMachine, broadcaster: Broadcaster) -> Self {
        Self {
            inner: Mutex::new(AuctionInner {
                machine,
                timers: RoundTimers::default(),
                launched: false,
            }),
            broadcaster,
        }
    }

    /// Schedules the first round after the configured start delay.
    ///
    /// Only the first call has an effect.
    pub async fn launch(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;
        if inner.launched {
            return;
        }
        inner.launched = true;
        let delay = Duration::from_secs(inner.machine.rules().first_round_delay_secs);
        self.arm_restart(&mut inner, delay);
        tracing::info!(delay_secs = delay.as_secs(), "auction house launched");
    }

    /// Starts the next round immediately, replacing any pending restart.
    pub async fn start_next_round(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;
        inner.launched = true;
        RoundTimers::cancel(&mut inner.timers.restart);
        self.open_round(&mut inner).await;
    }

    /// Ends the active round now.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NoActiveAuction`] if no round is active.
    pub async fn force_end(self: &Arc<Self>) -> Result<(), GatewayError> {
        let mut inner = self.inner.lock().await;
        if !inner.machine.round().is_active() {
            return Err(GatewayError::NoActiveAuction);
        }
        tracing::info!("auction round force-ended");
        self.close_round(&mut inner).await;
        Ok(())
    }

    /// Registers a participant and announces them to everyone else.
    ///
    /// The joiner gets a `welcome` notification; everybody else gets
    /// `user_joined`.
    pub async fn join(&self, identity: &Identity) -> JoinAck {
        let inner = self.inner.lock().await;
        let registry = self.broadcaster.registry();
        registry.register(identity).await;

        let _ = self
            .broadcaster
            .send_to(
                identity,
                Notification::with_message(
                    NotificationPayload::Welcome {
                        username: identity.clone(),
                    },
                    format!("Welcome {identity}! Get ready for legendary sci-fi treasures!"),
                ),
            )
            .await;
        let _ = self
            .broadcaster
            .broadcast(
                Notification::with_message(
                    NotificationPayload::UserJoined {
                        username: identity.clone(),
                    },
                    format!("{identity} entered the auction house"),
                ),
                Some(identity),
            )
            .await;

        let active_users = registry.len().await;
        tracing::info!(%identity, active_users, "joined auction");
        JoinAck {
            message: "Successfully joined the auction".to_string(),
            active_users,
            state: inner.machine.round().clone(),
        }
    }

    /// Unregisters a participant, discarding anything still queued.
    ///
    /// Returns `false` if the identity was not registered.
    pub async fn leave(&self, identity: &Identity) -> bool {
        let left = self.broadcaster.registry().unregister(identity).await.is_some();
        if left {
            tracing::info!(%identity, "left auction");
        }
        left
    }

    /// Places a bid for `bidder`, extending the deadline for late bids.
    ///
    /// # Errors
    ///
    /// See [`AuctionMachine::place_bid`].
    pub async fn place_bid(
        self: &Arc<Self>,
        bidder: &Identity,
        amount: u64,
    ) -> Result<BidReceipt, GatewayError> {
        let mut inner = self.inner.lock().await;
        let mut receipt = inner
            .machine
            .place_bid(bidder.clone(), amount, Utc::now())?;

        if receipt.extended {
            RoundTimers::cancel(&mut inner.timers.deadline);
            self.arm_deadline(&mut inner, Duration::from_secs(u64::from(receipt.time_remaining)));
        }

        for event in std::mem::take(&mut receipt.events) {
            self.publish(event).await;
        }
        Ok(receipt)
    }

    /// Snapshot of the current round.
    pub async fn current_state(&self) -> AuctionRound {
        self.inner.lock().await.machine.round().clone()
    }

    /// Concluded rounds with a winner, oldest first.
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.inner.lock().await.machine.history().to_vec()
    }

    /// Lots in catalog order.
    pub async fn catalog(&self) -> Vec<Lot> {
        self.inner.lock().await.machine.catalog().lots().to_vec()
    }

    /// Smallest acceptable bid right now, if a round is active.
    pub async fn minimum_bid(&self) -> Option<u64> {
        self.inner.lock().await.machine.minimum_bid()
    }

    /// Drains everything queued for `identity`.
    pub async fn poll(&self, identity: &Identity) -> Vec<Notification> {
        let batch = self.broadcaster.registry().drain(identity).await;
        if !batch.is_empty() {
            tracing::debug!(%identity, count = batch.len(), "auction poll");
        }
        batch
    }

    /// Number of registered participants.
    pub async fn active_users(&self) -> usize {
        self.broadcaster.registry().len().await
    }

    /// Cancels every pending timer. The round state is left as is.
    pub async fn shutdown(&self) {
        self.inner.lock().await.timers.cancel_all();
        tracing::info!("auction timers cancelled");
    }

    async fn publish(&self, event: AuctionEvent) {
        let _ = self
            .broadcaster
            .publish(NotificationPayload::from(event), None)
            .await;
    }

    /// Opens a round and arms its tick and deadline. Caller holds the lock.
    async fn open_round(self: &Arc<Self>, inner: &mut AuctionInner) {
        RoundTimers::cancel(&mut inner.timers.tick);
        RoundTimers::cancel(&mut inner.timers.deadline);

        let Some(event) = inner.machine.start_round(Utc::now()) else {
            tracing::warn!("auction catalog yielded no lot; round not started");
            return;
        };
        let duration = Duration::from_secs(u64::from(inner.machine.round().time_remaining));
        self.arm_ticker(inner);
        self.arm_deadline(inner, duration);
        self.publish(event).await;
    }

    /// Ends the round and arms the restart. Caller holds the lock.
    async fn close_round(self: &Arc<Self>, inner: &mut AuctionInner) {
        RoundTimers::cancel(&mut inner.timers.tick);
        RoundTimers::cancel(&mut inner.timers.deadline);

        if let Some(event) = inner.machine.end_round() {
            self.publish(event).await;
        }
        let delay = Duration::from_secs(inner.machine.rules().inter_round_delay_secs);
        self.arm_restart(inner, delay);
    }

    // Boxed: the deadline and restart jobs arm each other.
    fn on_deadline(self: Arc<Self>, epoch: u64) -> BoxFuture<'static, ()> {
        async move {
            let mut inner = self.inner.lock().await;
            if !RoundTimers::claim(&mut inner.timers.deadline, epoch) {
                return;
            }
            tracing::debug!(epoch, "round deadline fired");
            self.close_round(&mut inner).await;
        }
        .boxed()
    }

    fn on_restart(self: Arc<Self>, epoch: u64) -> BoxFuture<'static, ()> {
        async move {
            let mut inner = self.inner.lock().await;
            if !RoundTimers::claim(&mut inner.timers.restart, epoch) {
                return;
            }
            self.open_round(&mut inner).await;
        }
        .boxed()
    }

    /// Decrements the countdown. Returns `false` once the ticker is stale.
    async fn on_tick(&self, epoch: u64) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.timers.tick.as_ref().is_none_or(|t| t.epoch != epoch) {
            return false;
        }
        if let Some(event) = inner.machine.tick() {
            self.publish(event).await;
        }
        true
    }

    fn arm_deadline(self: &Arc<Self>, inner: &mut AuctionInner, delay: Duration) {
        let epoch = inner.timers.next_epoch();
        let handle = self.schedule(delay, epoch, Self::on_deadline);
        inner.timers.deadline = Some(ScheduledTask { epoch, handle });
    }

    fn arm_restart(self: &Arc<Self>, inner: &mut AuctionInner, delay: Duration) {
        RoundTimers::cancel(&mut inner.timers.restart);
        let epoch = inner.timers.next_epoch();
        let handle = self.schedule(delay, epoch, Self::on_restart);
        inner.timers.restart = Some(ScheduledTask { epoch, handle });
    }

    fn arm_ticker(self: &Arc<Self>, inner: &mut AuctionInner) {
        let epoch = inner.timers.next_epoch();
        let weak = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut ticker = time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let Some(service) = weak.upgrade() else {
                    break;
                };
                if !service.on_tick(epoch).await {
                    break;
                }
            }
        })
        .abort_handle();
        inner.timers.tick = Some(ScheduledTask { epoch, handle });
    }

    /// Spawns `job` to run after `delay`, unless the service is gone by then.
    fn schedule(self: &Arc<Self>, delay: Duration, epoch: u64, job: TimerJob) -> AbortHandle {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            time::sleep(delay).await;
            if let Some(service) = weak.upgrade() {
                job(service, epoch).await;
            }
        })
        .abort_handle()
    }
}
