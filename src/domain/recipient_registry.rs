//! Connected identities and their delivery queues.
//!
//! [`RecipientRegistry`] stores one [`DeliveryQueue`] per registered
//! identity in a `HashMap` whose entries are individually protected by a
//! [`tokio::sync::Mutex`]. Registration changes take the outer write lock;
//! enqueue, drain, and fan-out only take the outer read lock plus the
//! per-queue lock, so work on different identities runs in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::{DeliveryQueue, Identity, Notification};

/// Registry of identities currently able to receive notifications.
///
/// # Concurrency
///
/// - Register / unregister are serialized against fan-out: a broadcast sees
///   the registry either entirely before or entirely after a change.
/// - Enqueue / drain on the same identity are serialized by its queue lock.
/// - Operations on different identities proceed independently.
#[derive(Debug)]
pub struct RecipientRegistry {
    queues: RwLock<HashMap<Identity, Arc<Mutex<DeliveryQueue>>>>,
    capacity: usize,
}

impl RecipientRegistry {
    /// Creates an empty registry whose queues hold `capacity` notifications.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Registers an identity, creating an empty queue if it has none.
    ///
    /// Re-registering keeps any pending notifications so a rejoin resumes
    /// delivery. Returns `true` if the identity was newly registered.
    pub async fn register(&self, identity: &Identity) -> bool {
        let mut map = self.queues.write().await;
        if map.contains_key(identity) {
            tracing::debug!(%identity, "identity re-registered");
            return false;
        }
        map.insert(
            identity.clone(),
            Arc::new(Mutex::new(DeliveryQueue::new(self.capacity))),
        );
        tracing::debug!(%identity, registered = map.len(), "identity registered");
        true
    }

    /// Removes an identity and discards its undelivered notifications.
    ///
    /// Returns the number of discarded notifications, or `None` if the
    /// identity was not registered.
    pub async fn unregister(&self, identity: &Identity) -> Option<usize> {
        let removed = self.queues.write().await.remove(identity)?;
        let discarded = removed.lock().await.len();
        tracing::debug!(%identity, discarded, "identity unregistered");
        Some(discarded)
    }

    /// Appends a notification to one identity's queue.
    ///
    /// Returns `false` if the identity is not registered.
    pub async fn enqueue(&self, identity: &Identity, notification: Notification) -> bool {
        let map = self.queues.read().await;
        let Some(queue) = map.get(identity) else {
            return false;
        };
        let dropped = queue.lock().await.push(notification);
        if dropped > 0 {
            tracing::debug!(%identity, dropped, "delivery queue full, oldest dropped");
        }
        true
    }

    /// Appends a notification to every registered queue except `exclude`.
    ///
    /// The registry read lock is held for the whole fan-out. Returns the
    /// identities that received the notification.
    pub async fn enqueue_all(
        &self,
        notification: &Notification,
        exclude: Option<&Identity>,
    ) -> Vec<Identity> {
        let map = self.queues.read().await;
        let mut delivered = Vec::with_capacity(map.len());
        for (identity, queue) in map.iter() {
            if exclude == Some(identity) {
                continue;
            }
            let dropped = queue.lock().await.push(notification.clone());
            if dropped > 0 {
                tracing::debug!(%identity, dropped, "delivery queue full, oldest dropped");
            }
            delivered.push(identity.clone());
        }
        delivered
    }

    /// Atomically takes everything pending for an identity.
    ///
    /// Unregistered identities get an empty batch.
    pub async fn drain(&self, identity: &Identity) -> Vec<Notification> {
        let map = self.queues.read().await;
        match map.get(identity) {
            Some(queue) => queue.lock().await.drain(),
            None => Vec::new(),
        }
    }

    /// Returns `true` if the identity is registered.
    #[cfg(test)]
    pub async fn contains(&self, identity: &Identity) -> bool {
        self.queues.read().await.contains_key(identity)
    }

    /// Number of pending notifications for an identity (0 if unregistered).
    #[cfg(test)]
    pub async fn pending(&self, identity: &Identity) -> usize {
        let map = self.queues.read().await;
        match map.get(identity) {
            Some(queue) => queue.lock().await.len(),
            None => 0,
        }
    }

    /// Registered identities, sorted.
    #[cfg(test)]
    pub async fn identities(&self) -> Vec<Identity> {
        let mut ids: Vec<Identity> = self.queues.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the number of registered identities.
    pub async fn len(&self) -> usize {
        self.queues.read().await.len()
    }

    /// Returns `true` if nobody is registered.
    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.queues.read().await.is_empty()
    }}
