//! WebSocket message types: envelope and per-endpoint commands.
//!
//! Every frame in both directions is a [`WsMessage`]. Commands carry
//! `{"method": "<name>", ...params}` in `payload`; responses echo the
//! command id; errors carry `{code, message}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Note, NoteUpdate};
use crate::error::GatewayError;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; echoed on the reply.
    #[serde(default)]
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a successful reply to command `id`.
    #[must_use]
    pub fn response(id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error reply to command `id`.
    #[must_use]
    pub fn error(id: impl Into<String>, err: &GatewayError) -> Self {
        Self {
            id: id.into(),
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::to_value(err.to_body()).unwrap_or_default(),
        }
    }

    /// Serializes the envelope to a JSON text frame.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands accepted on `/ws/auction`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum AuctionCommand {
    /// Bind this session to a username and register it.
    Join {
        /// Display name.
        username: String,
    },
    /// Bid on the current lot.
    PlaceBid {
        /// Bid amount in whole dollars.
        amount: i64,
    },
    /// Snapshot of the current round.
    GetCurrentState,
    /// Sold lots, oldest first.
    GetHistory,
    /// Drain this session's queued notifications.
    PollMessages,
}

/// Commands accepted on `/ws/chat`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum ChatCommand {
    /// Bind this session to a username and go online.
    JoinChat {
        /// Display name.
        username: String,
    },
    /// Go offline.
    LeaveChat,
    /// Post a message.
    SendMessage {
        /// Message text.
        message: String,
    },
    /// Online users and retained messages.
    GetChatState,
    /// Drain this session's queued notifications.
    PollMessages,
}

/// Commands accepted on `/ws/notes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NotesCommand {
    /// Bind this session to a client id.
    Connect {
        /// Client identifier.
        client_id: String,
    },
    /// Release the client id.
    Disconnect,
    /// Every note, oldest first.
    GetAllNotes,
    /// Store a new note.
    CreateNote {
        /// The note to store.
        note: Note,
    },
    /// Partially update a note.
    UpdateNote {
        /// Target note id.
        note_id: String,
        /// Fields to change.
        updates: NoteUpdate,
    },
    /// Delete a note.
    DeleteNote {
        /// Target note id.
        note_id: String,
    },
    /// Reconcile a local batch with last-write-wins.
    SyncNotes {
        /// The client's notes.
        notes: Vec<Note>,
    },
    /// Drain this session's queued updates.
    PollUpdates,
}
