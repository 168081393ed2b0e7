//! `/ws/notes` session.

use std::sync::Arc;

use serde_json::json;

use super::connection::{RpcSession, to_payload};
use super::messages::NotesCommand;
use super::session::SessionBinding;
use crate::domain::Identity;
use crate::error::GatewayError;
use crate::service::NotesService;

/// One notes client's connection.
///
/// Every mutation requires a prior `connect`; polling before it yields
/// nothing.
#[derive(Debug)]
pub struct NotesSession {
    service: Arc<NotesService>,
    binding: SessionBinding,
}

impl NotesSession {
    /// Creates an unbound session.
    #[must_use]
    pub fn new(service: Arc<NotesService>) -> Self {
        Self {
            service,
            binding: SessionBinding::new(),
        }
    }
}

impl RpcSession for NotesSession {
    type Command = NotesCommand;
    const ENDPOINT: &'static str = "notes";

    async fn handle(&mut self, command: NotesCommand) -> Result<serde_json::Value, GatewayError> {
        match command {
            NotesCommand::Connect { client_id } => {
                let identity = Identity::parse(&client_id)?;
                if let Some(previous) = self.binding.bind(identity.clone()) {
                    self.service.disconnect(&previous).await;
                }
                let notes = self.service.connect(&identity).await;
                Ok(json!({ "message": "Connected", "client_id": identity, "notes": notes }))
            }
            NotesCommand::Disconnect => {
                if let Some(identity) = self.binding.release() {
                    self.service.disconnect(&identity).await;
                }
                Ok(json!({ "message": "Disconnected" }))
            }
            NotesCommand::GetAllNotes => to_payload(&self.service.all().await),
            NotesCommand::CreateNote { note } => {
                self.binding.require()?;
                to_payload(&self.service.create(note).await?)
            }
            NotesCommand::UpdateNote { note_id, updates } => {
                self.binding.require()?;
                to_payload(&self.service.update(&note_id, updates).await?)
            }
            NotesCommand::DeleteNote { note_id } => {
                self.binding.require()?;
                self.service.delete(&note_id).await?;
                Ok(json!({ "message": "Note deleted", "note_id": note_id }))
            }
            NotesCommand::SyncNotes { notes } => {
                self.binding.require()?;
                to_payload(&self.service.sync(notes).await?)
            }
            NotesCommand::PollUpdates => match self.binding.current() {
                Some(identity) => to_payload(&self.service.poll(identity).await),
                None => Ok(json!([])),
            },
        }
    }

    async fn close(mut self) {
        if let Some(identity) = self.binding.release() {
            self.service.disconnect(&identity).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Broadcaster, Note, NotesBoard, RecipientRegistry};

    fn make_service() -> Arc<NotesService> {
        Arc::new(NotesService::new(
            NotesBoard::new(),
            Broadcaster::new(Arc::new(RecipientRegistry::new(100))),
        ))
    }

    fn connect(id: &str) -> NotesCommand {
        NotesCommand::Connect {
            client_id: id.to_string(),
        }
    }

    fn create(id: &str) -> NotesCommand {
        NotesCommand::CreateNote {
            note: Note {
                id: id.to_string(),
                title: "title".to_string(),
                content: "body".to_string(),
                created_at: 0,
                updated_at: 0,
            },
        }
    }

    #[tokio::test]
    async fn mutations_require_connect() {
        let mut session = NotesSession::new(make_service());
        assert_eq!(session.handle(create("n1")).await, Err(GatewayError::NotJoined));
        assert!(session.handle(NotesCommand::Disconnect).await.is_ok());
    }

    #[tokio::test]
    async fn poll_before_connect_is_empty() {
        let service = make_service();
        let mut writer = NotesSession::new(Arc::clone(&service));
        let _ = writer.handle(connect("c1")).await;
        let _ = writer.handle(create("n1")).await;

        let mut idle = NotesSession::new(service);
        assert_eq!(idle.handle(NotesCommand::PollUpdates).await, Ok(json!([])));
    }

    #[tokio::test]
    async fn writes_fan_out_to_other_clients() {
        let service = make_service();
        let mut one = NotesSession::new(Arc::clone(&service));
        let mut two = NotesSession::new(Arc::clone(&service));
        let _ = one.handle(connect("c1")).await;
        let _ = two.handle(connect("c2")).await;

        let Ok(stored) = one.handle(create("n1")).await else {
            panic!("created");
        };
        assert_eq!(stored["id"], "n1");

        let Ok(updates) = two.handle(NotesCommand::PollUpdates).await else {
            panic!("poll ok");
        };
        assert_eq!(updates[0]["type"], "note_created");
        assert_eq!(updates[0]["note"]["title"], "title");

        assert_eq!(
            one.handle(NotesCommand::DeleteNote {
                note_id: "missing".to_string()
            })
            .await,
            Err(GatewayError::NoteNotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn connect_returns_existing_notes() {
        let service = make_service();
        let mut one = NotesSession::new(Arc::clone(&service));
        let _ = one.handle(connect("c1")).await;
        let _ = one.handle(create("n1")).await;

        let mut two = NotesSession::new(Arc::clone(&service));
        let Ok(ack) = two.handle(connect("c2")).await else {
            panic!("connected");
        };
        assert_eq!(ack["notes"][0]["id"], "n1");
        two.close().await;
        assert_eq!(service.connected_clients().await, 1);
    }
}
