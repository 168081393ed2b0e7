//! Chat room service.

use serde::Serialize;
use tokio::sync::Mutex;

use crate::domain::{
    Broadcaster, ChatMessage, ChatRoom, ChatSnapshot, Identity, Notification, NotificationPayload,
};
use crate::error::GatewayError;

/// Acknowledgement returned by [`ChatService::join`].
#[derive(Debug, Clone, Serialize)]
pub struct ChatJoinAck {
    /// Human-readable confirmation.
    pub message: String,
    /// Online users in join order, including the joiner.
    pub online_users: Vec<Identity>,
    /// The most recent messages, oldest first.
    pub recent_messages: Vec<ChatMessage>,
}

/// Chat room shared by every `/ws/chat` session.
#[derive(Debug)]
pub struct ChatService {
    room: Mutex<ChatRoom>,
    broadcaster: Broadcaster,
    recent_on_join: usize,
}

impl ChatService {
    /// Creates a new `ChatService`.
    #[must_use]
    pub fn new(room: ChatRoom, broadcaster: Broadcaster, recent_on_join: usize) -> Self {
        Self {
            room: Mutex::new(room),
            broadcaster,
            recent_on_join,
        }
    }

    /// Brings `identity` online.
    ///
    /// Everyone else hears `user_joined` only on the first join; the joiner
    /// always gets a `welcome`.
    pub async fn join(&self, identity: &Identity) -> ChatJoinAck {
        let mut room = self.room.lock().await;
        self.broadcaster.registry().register(identity).await;

        if room.add_user(identity) {
            let _ = self
                .broadcaster
                .broadcast(
                    Notification::with_message(
                        NotificationPayload::UserJoined {
                            username: identity.clone(),
                        },
                        format!("{identity} joined the chat"),
                    ),
                    Some(identity),
                )
                .await;
            tracing::info!(%identity, online = room.online_users().len(), "joined chat");
        }
        let _ = self
            .broadcaster
            .send_to(
                identity,
                Notification::with_message(
                    NotificationPayload::Welcome {
                        username: identity.clone(),
                    },
                    format!("Welcome to the chat, {identity}!"),
                ),
            )
            .await;

        ChatJoinAck {
            message: "Joined chat successfully".to_string(),
            online_users: room.online_users().to_vec(),
            recent_messages: room.recent(self.recent_on_join),
        }
    }

    /// Takes `identity` offline and tells the others.
    ///
    /// Returns `false` if they were not online.
    pub async fn leave(&self, identity: &Identity) -> bool {
        let mut room = self.room.lock().await;
        let _ = self.broadcaster.registry().unregister(identity).await;
        if !room.remove_user(identity) {
            return false;
        }
        let _ = self
            .broadcaster
            .broadcast(
                Notification::with_message(
                    NotificationPayload::UserLeft {
                        username: identity.clone(),
                    },
                    format!("{identity} left the chat"),
                ),
                None,
            )
            .await;
        tracing::info!(%identity, online = room.online_users().len(), "left chat");
        true
    }

    /// Posts a message from `identity` and broadcasts it to everyone,
    /// author included.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::NotJoined`] if `identity` is not online.
    /// - [`GatewayError::EmptyMessage`] if `text` is blank.
    pub async fn send_message(
        &self,
        identity: &Identity,
        text: &str,
    ) -> Result<ChatMessage, GatewayError> {
        let mut room = self.room.lock().await;
        if !room.online_users().contains(identity) {
            return Err(GatewayError::NotJoined);
        }
        let message = room.post(identity, text)?;
        let _ = self
            .broadcaster
            .publish(
                NotificationPayload::Message {
                    chat: message.clone(),
                },
                None,
            )
            .await;
        tracing::debug!(%identity, id = %message.id, "chat message posted");
        Ok(message)
    }

    /// Snapshot of online users and retained messages.
    pub async fn state(&self) -> ChatSnapshot {
        self.room.lock().await.snapshot()
    }

    /// Drains everything queued for `identity`.
    pub async fn poll(&self, identity: &Identity) -> Vec<Notification> {
        self.broadcaster.registry().drain(identity).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::RecipientRegistry;

    fn make_service() -> ChatService {
        let broadcaster = Broadcaster::new(Arc::new(RecipientRegistry::new(50)));
        ChatService::new(ChatRoom::new(100), broadcaster, 20)
    }

    async fn kinds(service: &ChatService, who: &Identity) -> Vec<&'static str> {
        service
            .poll(who)
            .await
            .iter()
            .map(Notification::type_str)
            .collect()
    }

    #[tokio::test]
    async fn join_announces_and_welcomes() {
        let service = make_service();
        let (a, b) = (Identity::new("ana"), Identity::new("bo"));
        service.join(&a).await;
        let ack = service.join(&b).await;
        assert_eq!(ack.online_users, [a.clone(), b.clone()]);

        assert_eq!(kinds(&service, &a).await, ["welcome", "user_joined"]);
        assert_eq!(kinds(&service, &b).await, ["welcome"]);
    }

    #[tokio::test]
    async fn rejoin_does_not_reannounce() {
        let service = make_service();
        let (a, b) = (Identity::new("ana"), Identity::new("bo"));
        service.join(&a).await;
        service.join(&b).await;
        let _ = service.poll(&a).await;
        service.join(&b).await;
        assert!(kinds(&service, &a).await.is_empty());
    }

    #[tokio::test]
    async fn messages_reach_everyone_including_author() {
        let service = make_service();
        let (a, b) = (Identity::new("ana"), Identity::new("bo"));
        service.join(&a).await;
        service.join(&b).await;
        let _ = service.poll(&a).await;
        let _ = service.poll(&b).await;

        let Ok(msg) = service.send_message(&a, "  hi all ").await else {
            panic!("message accepted");
        };
        assert_eq!(msg.message, "hi all");
        assert_eq!(kinds(&service, &a).await, ["message"]);
        assert_eq!(kinds(&service, &b).await, ["message"]);
        assert_eq!(service.state().await.messages.len(), 1);
    }

    #[tokio::test]
    async fn send_requires_join_and_text() {
        let service = make_service();
        let a = Identity::new("ana");
        assert_eq!(
            service.send_message(&a, "hello").await,
            Err(GatewayError::NotJoined)
        );
        service.join(&a).await;
        assert_eq!(
            service.send_message(&a, "   ").await,
            Err(GatewayError::EmptyMessage)
        );
    }

    #[tokio::test]
    async fn leave_notifies_remaining_users() {
        let service = make_service();
        let (a, b) = (Identity::new("ana"), Identity::new("bo"));
        service.join(&a).await;
        service.join(&b).await;
        let _ = service.poll(&a).await;

        assert!(service.leave(&b).await);
        assert!(!service.leave(&b).await);
        assert_eq!(kinds(&service, &a).await, ["user_left"]);
        assert!(service.poll(&b).await.is_empty());
        assert_eq!(service.state().await.online_users, [a]);
    }

    #[tokio::test]
    async fn join_returns_recent_messages() {
        let broadcaster = Broadcaster::new(Arc::new(RecipientRegistry::new(50)));
        let service = ChatService::new(ChatRoom::new(100), broadcaster, 2);
        let a = Identity::new("ana");
        service.join(&a).await;
        for text in ["one", "two", "three"] {
            let _ = service.send_message(&a, text).await;
        }
        let ack = service.join(&Identity::new("bo")).await;
        let texts: Vec<&str> = ack.recent_messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, ["two", "three"]);
    }
}
