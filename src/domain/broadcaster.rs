//! Fan-out of notifications into delivery queues.
//!
//! [`Broadcaster`] is the single subscriber for domain events. It stamps
//! each payload into a [`Notification`] and enqueues it into the queue of
//! every identity in its [`RecipientRegistry`], optionally skipping one.
//! Nothing is pushed to clients; they drain their own queue on poll.

use std::sync::Arc;

use super::{Identity, Notification, NotificationPayload, RecipientRegistry};

/// Broadcasts notifications to registered identities.
///
/// Cheap to clone; clones share the same registry.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<RecipientRegistry>,
}

impl Broadcaster {
    /// Creates a broadcaster over the given registry.
    #[must_use]
    pub fn new(registry: Arc<RecipientRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<RecipientRegistry> {
        &self.registry
    }

    /// Enqueues `notification` for every registered identity except
    /// `exclude`, returning who was notified.
    pub async fn broadcast(
        &self,
        notification: Notification,
        exclude: Option<&Identity>,
    ) -> Vec<Identity> {
        let delivered = self.registry.enqueue_all(&notification, exclude).await;
        tracing::debug!(
            kind = notification.type_str(),
            recipients = delivered.len(),
            "notification broadcast"
        );
        delivered
    }

    /// Wraps `payload` with its default message and broadcasts it.
    pub async fn publish(
        &self,
        payload: NotificationPayload,
        exclude: Option<&Identity>,
    ) -> Vec<Identity> {
        self.broadcast(Notification::new(payload), exclude).await
    }

    /// Enqueues a notification for a single identity.
    ///
    /// Returns `false` if the identity is not registered.
    pub async fn send_to(&self, identity: &Identity, notification: Notification) -> bool {
        let kind = notification.type_str();
        let delivered = self.registry.enqueue(identity, notification).await;
        tracing::debug!(%identity, kind, delivered, "notification sent");
        delivered
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn make_broadcaster(names: &[&str]) -> (Broadcaster, Arc<RecipientRegistry>) {
        let registry = Arc::new(RecipientRegistry::new(50));
        for name in names {
            registry.register(&Identity::new(*name)).await;
        }
        (Broadcaster::new(Arc::clone(&registry)), registry)
    }

    #[tokio::test]
    async fn broadcast_without_recipients_notifies_nobody() {
        let (broadcaster, _) = make_broadcaster(&[]).await;
        let delivered = broadcaster
            .publish(NotificationPayload::TimerUpdate { time_remaining: 3 }, None)
            .await;
        assert!(delivered.is_empty());
    }

    #[tokio::test]
    async fn broadcast_reaches_everyone_but_excluded() {
        let (broadcaster, registry) = make_broadcaster(&["a", "b", "x"]).await;
        let x = Identity::new("x");
        let notification = Notification::new(NotificationPayload::UserJoined {
            username: x.clone(),
        });
        let id = notification.id;

        let delivered = broadcaster.broadcast(notification, Some(&x)).await;
        assert_eq!(delivered.len(), 2);
        assert!(!delivered.contains(&x));
        assert!(registry.drain(&x).await.is_empty());

        for name in ["a", "b"] {
            let batch = registry.drain(&Identity::new(name)).await;
            assert_eq!(batch.len(), 1);
            assert!(batch.iter().all(|n| n.id == id));
        }
    }

    #[tokio::test]
    async fn send_to_targets_one_identity() {
        let (broadcaster, registry) = make_broadcaster(&["a", "b"]).await;
        let a = Identity::new("a");
        let sent = broadcaster
            .send_to(
                &a,
                Notification::new(NotificationPayload::Welcome { username: a.clone() }),
            )
            .await;
        assert!(sent);
        assert_eq!(registry.pending(&a).await, 1);
        assert_eq!(registry.pending(&Identity::new("b")).await, 0);
        assert!(
            !broadcaster
                .send_to(
                    &Identity::new("nobody"),
                    Notification::new(NotificationPayload::TimerUpdate { time_remaining: 1 })
                )
                .await
        );
    }
}
