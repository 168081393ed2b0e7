//! Bounded per-identity notification buffer.

use std::collections::VecDeque;

use super::Notification;

/// Ordered buffer of notifications awaiting a poll.
///
/// When a push takes the queue past its capacity the oldest entries are
/// dropped, so a participant who stops polling loses history rather than
/// stalling producers.
#[derive(Debug)]
pub struct DeliveryQueue {
    items: VecDeque<Notification>,
    capacity: usize,
}

impl DeliveryQueue {
    /// Creates an empty queue holding at most `capacity` notifications.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a notification, returning how many old entries were dropped.
    pub fn push(&mut self, notification: Notification) -> usize {
        self.items.push_back(notification);
        let mut dropped = 0;
        while self.items.len() > self.capacity {
            self.items.pop_front();
            dropped += 1;
        }
        dropped
    }

    /// Takes every pending notification, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.items).into()
    }

    /// Number of pending notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of pending notifications.
    #[cfg(test)]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
