use chrono::{DateTime, Utc};
use db::models::note::Note;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of create and update requests.
#[derive(Debug, Default, Deserialize)]
pub struct NoteInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        NoteResponse {
            id: note.id,
            title: note.title,
            content: note.content,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotesResponse {
    pub notes: Vec<NoteResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteEnvelope {
    pub note: NoteResponse,
}
