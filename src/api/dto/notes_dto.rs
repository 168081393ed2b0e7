//! Notes DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Note;

/// Response body for `GET /api/v1/notes`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotesListResponse {
    /// Notes, oldest first.
    pub notes: Vec<Note>,
    /// Number of notes.
    pub count: usize,
    /// Connected notes clients.
    pub connected_clients: usize,
}
