//! Shared note set with server-stamped timestamps.
//!
//! Writes stamp `updated_at` with server time. [`NotesBoard::sync_one`]
//! reconciles a client's batch using last-write-wins on `updated_at`.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GatewayError;

/// A note. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Note {
    /// Client-chosen id.
    pub id: String,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Body.
    #[serde(default)]
    pub content: String,
    /// Creation time.
    #[serde(default)]
    pub created_at: i64,
    /// Last write time.
    #[serde(default)]
    pub updated_at: i64,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct NoteUpdate {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New body.
    #[serde(default)]
    pub content: Option<String>,
}

/// Effect of syncing one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Unknown id, stored as new.
    Created(Note),
    /// Client copy was newer and replaced the stored one.
    Updated(Note),
    /// Stored copy was newer or equal and was kept.
    Kept(Note),
}

impl SyncOutcome {
    /// The note as stored after the sync.
    #[must_use]
    pub fn note(&self) -> &Note {
        match self {
            Self::Created(n) | Self::Updated(n) | Self::Kept(n) => n,
        }
    }
}

/// In-memory note store.
#[derive(Debug, Default)]
pub struct NotesBoard {
    notes: HashMap<String, Note>,
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

impl NotesBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a note, stamping `updated_at` (and `created_at` if unset).
    ///
    /// An existing note with the same id is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the id is blank.
    pub fn create(&mut self, mut note: Note) -> Result<Note, GatewayError> {
        if note.id.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "note id cannot be empty".to_string(),
            ));
        }
        let now = now_millis();
        if note.created_at == 0 {
            note.created_at = now;
        }
        note.updated_at = now;
        self.notes.insert(note.id.clone(), note.clone());
        Ok(note)
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NoteNotFound`] for an unknown id.
    pub fn update(&mut self, note_id: &str, update: NoteUpdate) -> Result<Note, GatewayError> {
        let note = self
            .notes
            .get_mut(note_id)
            .ok_or_else(|| GatewayError::NoteNotFound(note_id.to_string()))?;
        if let Some(title) = update.title {
            note.title = title;
        }
        if let Some(content) = update.content {
            note.content = content;
        }
        note.updated_at = now_millis();
        Ok(note.clone())
    }

    /// Removes a note.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NoteNotFound`] for an unknown id.
    pub fn delete(&mut self, note_id: &str) -> Result<Note, GatewayError> {
        self.notes
            .remove(note_id)
            .ok_or_else(|| GatewayError::NoteNotFound(note_id.to_string()))
    }

    /// Looks up a note.
    #[cfg(test)]
    #[must_use]
    pub fn get(&self, note_id: &str) -> Option<&Note> {
        self.notes.get(note_id)
    }

    /// Every note, oldest first (ties broken by id).
    #[must_use]
    pub fn all(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = self.notes.values().cloned().collect();
        notes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        notes
    }

    /// Reconciles one client note with last-write-wins.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if a new note has a blank id.
    pub fn sync_one(&mut self, note: Note) -> Result<SyncOutcome, GatewayError> {
        let stored_at = self.notes.get(&note.id).map(|n| n.updated_at);
        match stored_at {
            None => self.create(note).map(SyncOutcome::Created),
            Some(stored_at) if note.updated_at > stored_at => {
                let update = NoteUpdate {
                    title: Some(note.title),
                    content: Some(note.content),
                };
                self.update(&note.id, update).map(SyncOutcome::Updated)
            }
            Some(_) => self
                .notes
                .get(&note.id)
                .cloned()
                .map(SyncOutcome::Kept)
                .ok_or(GatewayError::NoteNotFound(note.id)),
        }
    }

    /// Number of stored notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Returns `true` if no notes are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
