//! Chat room state: who is online and the recent message log.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Identity;
use crate::error::GatewayError;

/// A posted chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChatMessage {
    /// Unique message id.
    pub id: Uuid,
    /// Author.
    #[schema(value_type = String)]
    pub username: Identity,
    /// Trimmed message text.
    pub message: String,
    /// When the server accepted the message.
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the room.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatSnapshot {
    /// Online users in join order.
    #[schema(value_type = Vec<String>)]
    pub online_users: Vec<Identity>,
    /// Retained messages, oldest first.
    pub messages: Vec<ChatMessage>,
}

/// Online-user list plus a bounded message log.
#[derive(Debug)]
pub struct ChatRoom {
    online_users: Vec<Identity>,
    messages: VecDeque<ChatMessage>,
    history_limit: usize,
}

impl ChatRoom {
    /// Creates an empty room that retains at most `history_limit` messages.
    #[must_use]
    pub fn new(history_limit: usize) -> Self {
        Self {
            online_users: Vec::new(),
            messages: VecDeque::new(),
            history_limit: history_limit.max(1),
        }
    }

    /// Marks a user online. Returns `false` if they already were.
    pub fn add_user(&mut self, username: &Identity) -> bool {
        if self.online_users.contains(username) {
            return false;
        }
        self.online_users.push(username.clone());
        true
    }

    /// Marks a user offline. Returns `false` if they were not online.
    pub fn remove_user(&mut self, username: &Identity) -> bool {
        let before = self.online_users.len();
        self.online_users.retain(|u| u != username);
        self.online_users.len() != before
    }

    /// Records a message from `username`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EmptyMessage`] if `text` is blank after
    /// trimming.
    pub fn post(&mut self, username: &Identity, text: &str) -> Result<ChatMessage, GatewayError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GatewayError::EmptyMessage);
        }
        let message = ChatMessage {
            id: Uuid::new_v4(),
            username: username.clone(),
            message: text.to_string(),
            timestamp: Utc::now(),
        };
        self.messages.push_back(message.clone());
        while self.messages.len() > self.history_limit {
            self.messages.pop_front();
        }
        Ok(message)
    }

    /// Online users in join order.
    #[must_use]
    pub fn online_users(&self) -> &[Identity] {
        self.online_users.as_slice()
    }

    /// The most recent `count` messages, oldest first.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<ChatMessage> {
        let skip = self.messages.len().saturating_sub(count);
        self.messages.iter().skip(skip).cloned().collect()
    }

    /// Full snapshot of the room.
    #[must_use]
    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            online_users: self.online_users.clone(),
            messages: self.messages.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn add_user_once() {
        let mut room = ChatRoom::new(100);
        let a = Identity::new("a");
        assert!(room.add_user(&a));
        assert!(!room.add_user(&a));
        assert_eq!(room.online_users().len(), 1);
        assert!(room.remove_user(&a));
        assert!(!room.remove_user(&a));
    }

    #[test]
    fn post_trims_and_rejects_blank() {
        let mut room = ChatRoom::new(100);
        let a = Identity::new("a");
        assert_eq!(room.post(&a, "   "), Err(GatewayError::EmptyMessage));
        let Ok(msg) = room.post(&a, "  hello  ") else {
            panic!("valid message");
        };
        assert_eq!(msg.message, "hello");
    }

    #[test]
    fn log_keeps_most_recent() {
        let mut room = ChatRoom::new(3);
        let a = Identity::new("a");
        for n in 0..5 {
            let _ = room.post(&a, &format!("m{n}"));
        }
        let texts: Vec<String> = room.snapshot().messages.into_iter().map(|m| m.message).collect();
        assert_eq!(texts, ["m2", "m3", "m4"]);
        let recent: Vec<String> = room.recent(2).into_iter().map(|m| m.message).collect();
        assert_eq!(recent, ["m3", "m4"]);
    }
}
