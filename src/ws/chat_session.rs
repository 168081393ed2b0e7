//! `/ws/chat` session.

use std::sync::Arc;

use serde_json::json;

use super::connection::{RpcSession, to_payload};
use super::messages::ChatCommand;
use super::session::SessionBinding;
use crate::domain::Identity;
use crate::error::GatewayError;
use crate::service::ChatService;

/// One chat participant's connection.
#[derive(Debug)]
pub struct ChatSession {
    service: Arc<ChatService>,
    binding: SessionBinding,
}

impl ChatSession {
    /// Creates an unbound session.
    #[must_use]
    pub fn new(service: Arc<ChatService>) -> Self {
        Self {
            service,
            binding: SessionBinding::new(),
        }
    }
}

impl RpcSession for ChatSession {
    type Command = ChatCommand;
    const ENDPOINT: &'static str = "chat";

    async fn handle(&mut self, command: ChatCommand) -> Result<serde_json::Value, GatewayError> {
        match command {
            ChatCommand::JoinChat { username } => {
                let identity = Identity::parse(&username)?;
                if let Some(previous) = self.binding.bind(identity.clone()) {
                    self.service.leave(&previous).await;
                }
                to_payload(&self.service.join(&identity).await)
            }
            ChatCommand::LeaveChat => {
                let identity = self.binding.release().ok_or(GatewayError::NotJoined)?;
                self.service.leave(&identity).await;
                Ok(json!({ "message": "Left chat" }))
            }
            ChatCommand::SendMessage { message } => {
                let identity = self.binding.require()?;
                let posted = self.service.send_message(identity, &message).await?;
                Ok(json!({ "message": "Message sent", "chat": posted }))
            }
            ChatCommand::GetChatState => to_payload(&self.service.state().await),
            ChatCommand::PollMessages => match self.binding.current() {
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

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Broadcaster, ChatRoom, RecipientRegistry};

    fn make_service() -> Arc<ChatService> {
        Arc::new(ChatService::new(
            ChatRoom::new(100),
            Broadcaster::new(Arc::new(RecipientRegistry::new(50))),
            20,
        ))
    }

    fn join(name: &str) -> ChatCommand {
        ChatCommand::JoinChat {
            username: name.to_string(),
        }
    }

    #[tokio::test]
    async fn send_before_join_is_rejected() {
        let mut session = ChatSession::new(make_service());
        assert_eq!(
            session
                .handle(ChatCommand::SendMessage {
                    message: "hi".to_string()
                })
                .await,
            Err(GatewayError::NotJoined)
        );
        assert_eq!(
            session.handle(ChatCommand::LeaveChat).await,
            Err(GatewayError::NotJoined)
        );
    }

    #[tokio::test]
    async fn join_then_send_round_trips_through_poll() {
        let service = make_service();
        let mut ana = ChatSession::new(Arc::clone(&service));
        let mut bo = ChatSession::new(Arc::clone(&service));
        let _ = ana.handle(join("ana")).await;
        let Ok(ack) = bo.handle(join("bo")).await else {
            panic!("joined");
        };
        assert_eq!(ack["online_users"], json!(["ana", "bo"]));

        let _ = ana.handle(ChatCommand::PollMessages).await;
        let _ = bo.handle(ChatCommand::PollMessages).await;
        let Ok(sent) = bo
            .handle(ChatCommand::SendMessage {
                message: " hey ".to_string(),
            })
            .await
        else {
            panic!("sent");
        };
        assert_eq!(sent["chat"]["message"], "hey");

        let Ok(batch) = ana.handle(ChatCommand::PollMessages).await else {
            panic!("poll ok");
        };
        assert_eq!(batch[0]["type"], "message");
        assert_eq!(batch[0]["chat"]["username"], "bo");
    }

    #[tokio::test]
    async fn disconnect_leaves_room() {
        let service = make_service();
        let mut ana = ChatSession::new(Arc::clone(&service));
        let mut bo = ChatSession::new(Arc::clone(&service));
        let _ = ana.handle(join("ana")).await;
        let _ = bo.handle(join("bo")).await;
        let _ = ana.handle(ChatCommand::PollMessages).await;

        bo.close().await;
        assert_eq!(
            service.state().await.online_users,
            [Identity::new("ana")]
        );
        let Ok(batch) = ana.handle(ChatCommand::PollMessages).await else {
            panic!("poll ok");
        };
        assert_eq!(batch[0]["type"], "user_left");
    }
}
