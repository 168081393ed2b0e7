//! Shared notes service.

use tokio::sync::Mutex;

use crate::domain::{
    Broadcaster, Identity, Note, NoteUpdate, NotesBoard, Notification, NotificationPayload,
    SyncOutcome,
};
use crate::error::GatewayError;

/// Note set shared by every `/ws/notes` client.
///
/// Every write is broadcast to all connected clients, the writer included,
/// so each client converges on the server copy.
#[derive(Debug)]
pub struct NotesService {
    board: Mutex<NotesBoard>,
    broadcaster: Broadcaster,
}

impl NotesService {
    /// Creates a new `NotesService`.
    #[must_use]
    pub fn new(board: NotesBoard, broadcaster: Broadcaster) -> Self {
        Self {
            board: Mutex::new(board),
            broadcaster,
        }
    }

    /// Registers a client and returns the current notes.
    pub async fn connect(&self, client_id: &Identity) -> Vec<Note> {
        let board = self.board.lock().await;
        self.broadcaster.registry().register(client_id).await;
        tracing::info!(client = %client_id, notes = board.len(), "notes client connected");
        board.all()
    }

    /// Unregisters a client. Returns `false` if it was not connected.
    pub async fn disconnect(&self, client_id: &Identity) -> bool {
        let removed = self.broadcaster.registry().unregister(client_id).await.is_some();
        if removed {
            tracing::info!(client = %client_id, "notes client disconnected");
        }
        removed
    }

    /// Every note, oldest first.
    pub async fn all(&self) -> Vec<Note> {
        self.board.lock().await.all()
    }

    /// Stores a new note and broadcasts `note_created`.
    ///
    /// # Errors
    ///
    /// See [`NotesBoard::create`].
    pub async fn create(&self, note: Note) -> Result<Note, GatewayError> {
        let mut board = self.board.lock().await;
        let stored = board.create(note)?;
        self.publish(NotificationPayload::NoteCreated {
            note: stored.clone(),
        })
        .await;
        Ok(stored)
    }

    /// Applies a partial update and broadcasts `note_updated`.
    ///
    /// # Errors
    ///
    /// See [`NotesBoard::update`].
    pub async fn update(&self, note_id: &str, update: NoteUpdate) -> Result<Note, GatewayError> {
        let mut board = self.board.lock().await;
        let stored = board.update(note_id, update)?;
        self.publish(NotificationPayload::NoteUpdated {
            note: stored.clone(),
        })
        .await;
        Ok(stored)
    }

    /// Deletes a note and broadcasts `note_deleted`.
    ///
    /// # Errors
    ///
    /// See [`NotesBoard::delete`].
    pub async fn delete(&self, note_id: &str) -> Result<(), GatewayError> {
        let mut board = self.board.lock().await;
        let removed = board.delete(note_id)?;
        self.publish(NotificationPayload::NoteDeleted {
            note_id: removed.id,
        })
        .await;
        Ok(())
    }

    /// Reconciles a client batch with last-write-wins and returns the
    /// stored version of each note in the batch, in batch order.
    ///
    /// Only notes that changed server state are broadcast. A note with a
    /// blank id fails the whole call, but earlier notes stay applied.
    ///
    /// # Errors
    ///
    /// See [`NotesBoard::sync_one`].
    pub async fn sync(&self, notes: Vec<Note>) -> Result<Vec<Note>, GatewayError> {
        let mut board = self.board.lock().await;
        let mut reconciled = Vec::with_capacity(notes.len());
        for note in notes {
            let outcome = board.sync_one(note)?;
            reconciled.push(outcome.note().clone());
            match outcome {
                SyncOutcome::Created(note) => {
                    self.publish(NotificationPayload::NoteCreated { note }).await;
                }
                SyncOutcome::Updated(note) => {
                    self.publish(NotificationPayload::NoteUpdated { note }).await;
                }
                SyncOutcome::Kept(_) => {}
            }
        }
        Ok(reconciled)
    }

    /// Drains everything queued for `client_id`.
    pub async fn poll(&self, client_id: &Identity) -> Vec<Notification> {
        self.broadcaster.registry().drain(client_id).await
    }

    /// Number of connected clients.
    pub async fn connected_clients(&self) -> usize {
        self.broadcaster.registry().len().await
    }

    async fn publish(&self, payload: NotificationPayload) {
        let _ = self.broadcaster.publish(payload, None).await;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::RecipientRegistry;

    fn make_service() -> NotesService {
        let broadcaster = Broadcaster::new(Arc::new(RecipientRegistry::new(100)));
        NotesService::new(NotesBoard::new(), broadcaster)
    }

    fn draft(id: &str, title: &str) -> Note {
        Note {
            id: id.to_string(),
            title: title.to_string(),
            content: String::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    async fn kinds(service: &NotesService, who: &Identity) -> Vec<&'static str> {
        service
            .poll(who)
            .await
            .iter()
            .map(Notification::type_str)
            .collect()
    }

    #[tokio::test]
    async fn writes_reach_every_client() {
        let service = make_service();
        let (c1, c2) = (Identity::new("c1"), Identity::new("c2"));
        assert!(service.connect(&c1).await.is_empty());
        service.connect(&c2).await;

        let _ = service.create(draft("n1", "first")).await;
        let _ = service
            .update(
                "n1",
                NoteUpdate {
                    title: Some("renamed".to_string()),
                    content: None,
                },
            )
            .await;
        let _ = service.delete("n1").await;

        let expected = ["note_created", "note_updated", "note_deleted"];
        assert_eq!(kinds(&service, &c1).await, expected);
        assert_eq!(kinds(&service, &c2).await, expected);
        assert!(service.all().await.is_empty());
    }

    #[tokio::test]
    async fn connect_returns_existing_notes() {
        let service = make_service();
        let _ = service.create(draft("n1", "first")).await;
        let notes = service.connect(&Identity::new("c1")).await;
        assert_eq!(notes.len(), 1);
        assert_eq!(service.connected_clients().await, 1);
    }

    #[tokio::test]
    async fn failed_writes_broadcast_nothing() {
        let service = make_service();
        let c1 = Identity::new("c1");
        service.connect(&c1).await;
        assert!(service.delete("missing").await.is_err());
        assert!(service.update("missing", NoteUpdate::default()).await.is_err());
        assert!(service.create(draft("", "blank")).await.is_err());
        assert!(kinds(&service, &c1).await.is_empty());
    }

    #[tokio::test]
    async fn sync_broadcasts_only_changes() {
        let service = make_service();
        let c1 = Identity::new("c1");
        service.connect(&c1).await;
        let Ok(stored) = service.create(draft("n1", "server")).await else {
            panic!("created");
        };
        let _ = service.poll(&c1).await;

        let stale = Note {
            updated_at: stored.updated_at - 1,
            ..draft("n1", "stale")
        };
        let Ok(notes) = service.sync(vec![stale, draft("n2", "new")]).await else {
            panic!("synced");
        };
        assert_eq!(notes.len(), 2);
        assert_eq!(kinds(&service, &c1).await, ["note_created"]);
        assert!(notes.iter().any(|n| n.id == "n1" && n.title == "server"));
    }

    #[tokio::test]
    async fn sync_returns_only_the_batch() {
        let service = make_service();
        let _ = service.create(draft("n0", "untouched")).await;
        let incoming = Note {
            updated_at: 42,
            ..draft("n1", "client")
        };

        let Ok(notes) = service.sync(vec![incoming]).await else {
            panic!("synced");
        };
        let [only] = notes.as_slice() else {
            panic!("expected one note, got {notes:?}");
        };
        assert_eq!((only.id.as_str(), only.title.as_str()), ("n1", "client"));
        assert_eq!(service.all().await.len(), 2);
    }

    #[tokio::test]
    async fn disconnect_stops_delivery() {
        let service = make_service();
        let c1 = Identity::new("c1");
        service.connect(&c1).await;
        assert!(service.disconnect(&c1).await);
        assert!(!service.disconnect(&c1).await);
        let _ = service.create(draft("n1", "x")).await;
        assert!(service.poll(&c1).await.is_empty());
    }
}
